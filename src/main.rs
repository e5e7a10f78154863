#[macro_use]
extern crate log;
#[macro_use(new_key_type)]
extern crate slotmap;

mod helpers;
mod relay;
mod server;

use helpers::*;
use std::error::Error;

fn run() -> Result<(), Box<dyn Error>> {
    let conf = config::build_config()?;
    if conf.happy_exit {
        return Ok(());
    }
    let acceptor = server::Acceptor::new(&conf.server, &real_filesystem())?;
    let mut event_loop = server::EventLoop::bind(&conf.server, acceptor)?;
    let quit_handle = event_loop.quit_handle();
    ctrlc::set_handler(move || {
        info!("interrupted, shutting down");
        quit_handle.quit();
    })?;
    event_loop.run()
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    if let Err(e) = run() {
        error!("{}", e);
        std::process::exit(1);
    }
}
