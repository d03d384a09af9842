#![cfg_attr(
    all(target_os = "windows", not(debug_assertions)),
    windows_subsystem = "windows"
)]

#[cfg(target_os = "windows")]
mod windows_app;

#[cfg(target_os = "windows")]
fn main() -> anyhow::Result<()> {
    windows_app::run(parse_config_arg())
}

#[cfg(not(target_os = "windows"))]
fn main() -> anyhow::Result<()> {
    let (_state, mut server) = prompt_studio::server::launch(parse_config_arg())?;
    println!(
        "Prompt Studio running at http://127.0.0.1:{}/",
        server.port()
    );
    println!("Press Ctrl-C to stop.");
    server.wait();
    Ok(())
}

fn parse_config_arg() -> Option<String> {
    let mut config = None;
    let mut args = std::env::args().skip(1);

    while let Some(arg) = args.next() {
        if arg == "--config" {
            if let Some(value) = args.next() {
                config = Some(value);
            }
        }
    }

    config
}
