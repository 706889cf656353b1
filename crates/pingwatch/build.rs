//! Renders man pages and shell completions for `pingwatch` into `OUT_DIR`
//! so packagers can pick them up from `target/*/build/pingwatch-*/out`.

use std::fs;
use std::io;
use std::path::Path;

use clap::CommandFactory;
use clap_complete::Shell;

// cli.rs only depends on clap and clap_complete, both build-dependencies.
#[path = "src/cli.rs"]
mod cli;

fn main() -> io::Result<()> {
    println!("cargo::rerun-if-changed=src/cli.rs");

    let out_dir = std::env::var_os("OUT_DIR")
        .ok_or_else(|| io::Error::other("OUT_DIR is not set; run through cargo"))?;
    let out_dir = Path::new(&out_dir);

    let mut cmd = cli::Cli::command();

    let man_dir = out_dir.join("man");
    fs::create_dir_all(&man_dir)?;
    write_man_pages(&cmd, &man_dir)?;

    let completion_dir = out_dir.join("completions");
    fs::create_dir_all(&completion_dir)?;
    for shell in [Shell::Bash, Shell::Zsh, Shell::Fish] {
        clap_complete::generate_to(shell, &mut cmd, "pingwatch", &completion_dir)?;
    }
    Ok(())
}

/// One page per visible command, named `pingwatch-sites-list.1` style.
fn write_man_pages(root: &clap::Command, dir: &Path) -> io::Result<()> {
    let mut pending = vec![(root.get_name().to_owned(), root.clone())];
    while let Some((page, cmd)) = pending.pop() {
        pending.extend(
            cmd.get_subcommands()
                .filter(|sub| !sub.is_hide_set())
                .map(|sub| (format!("{page}-{}", sub.get_name()), sub.clone())),
        );

        let mut buf = Vec::new();
        clap_mangen::Man::new(cmd.name(page.clone())).render(&mut buf)?;
        fs::write(dir.join(format!("{page}.1")), buf)?;
    }
    Ok(())
}
