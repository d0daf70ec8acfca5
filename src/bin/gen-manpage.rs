//! Render gpioc(1) and one page per subcommand (gpioc-list(1), ...)
//!
//! Usage: gen-manpage [output-dir]   (default: ./man)

use clap::CommandFactory;
use std::fs;
use std::path::{Path, PathBuf};

#[allow(dead_code)]
#[path = "../backends.rs"]
mod backends;

#[allow(dead_code)]
#[path = "../cli.rs"]
mod cli;

fn render(cmd: clap::Command, dir: &Path, page: &str) -> std::io::Result<PathBuf> {
    let mut buffer = Vec::new();
    clap_mangen::Man::new(cmd).render(&mut buffer)?;
    let path = dir.join(format!("{}.1", page));
    fs::write(&path, buffer)?;
    Ok(path)
}

fn main() -> std::io::Result<()> {
    let output_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("man"));
    fs::create_dir_all(&output_dir)?;

    let cmd = cli::Cli::command();
    let mut pages = vec![render(cmd.clone(), &output_dir, "gpioc")?];

    for sub in cmd.get_subcommands() {
        let page = format!("gpioc-{}", sub.get_name());
        pages.push(render(sub.clone().display_name(page.clone()), &output_dir, &page)?);
    }

    for page in &pages {
        println!("{}", page.display());
    }
    Ok(())
}
