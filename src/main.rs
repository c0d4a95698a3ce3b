mod app;
mod audio;
mod config;
mod download;
mod error;
mod library;
mod logging;
mod media;
mod mpris;
mod playlist;
mod runtime;
mod ui;

#[cfg(test)]
mod test_util;

fn main() -> anyhow::Result<()> {
    runtime::run()
}
