// Drives the compiled binary through a pseudo terminal. Unix-only and
// ignored by default; run with `cargo test --test tui_pty -- --ignored`.

#![cfg(unix)]

use std::time::Duration;

use expectrl::{spawn, Eof};

#[test]
#[ignore]
fn classic_round_then_quit() -> Result<(), Box<dyn std::error::Error>> {
    let home = tempfile::tempdir()?;
    let bin = assert_cmd::cargo::cargo_bin("guess-the-elo");
    let cmd = format!(
        "env HOME={} XDG_CONFIG_HOME={}/config {} --mode classic --seed 7",
        home.path().display(),
        home.path().display(),
        bin.display()
    );
    let mut p = spawn(cmd)?;
    std::thread::sleep(Duration::from_millis(300));

    // start, answer, back to menu, quit
    p.send("\r")?;
    std::thread::sleep(Duration::from_millis(200));
    p.send("1")?;
    std::thread::sleep(Duration::from_millis(200));
    p.send("\x1b")?;
    std::thread::sleep(Duration::from_millis(200));
    p.send("\x1b")?;

    p.expect(Eof)?;
    Ok(())
}
