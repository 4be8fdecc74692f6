use anyhow::Result;
use clap::{Arg, ArgMatches, Command};
use magpie_core::{BuildStats, Builder, Project};

pub fn make_subcommand() -> Command {
    Command::new("build")
        .about("Build the site into public/")
        .arg(
            Arg::new("root")
                .short('r')
                .long("root")
                .value_name("DIR")
                .help("Project root directory")
                .default_value("."),
        )
        .arg(
            Arg::new("clean")
                .long("clean")
                .help("Remove existing output and rebuild everything")
                .action(clap::ArgAction::SetTrue),
        )
}

pub fn execute(args: &ArgMatches) -> Result<()> {
    let root = args.get_one::<String>("root").expect("has default");
    let project = Project::new(root);

    if !project.exists() {
        eprintln!("✗ No site directory found. Run this command from a .site directory.");
        std::process::exit(1);
    }

    println!("Building site...");
    let stats = Builder::new(&project).clean(args.get_flag("clean")).build()?;
    show_results(&stats);

    Ok(())
}

fn show_results(stats: &BuildStats) {
    if stats.success() {
        println!(
            "✓ Built {} pages in {:.2}s",
            stats.files_built,
            stats.total_time.as_secs_f64()
        );
        if stats.files_skipped > 0 {
            println!("  Skipped {} unchanged files", stats.files_skipped);
        }
        if stats.assets_copied > 0 {
            println!("  Copied {} assets", stats.assets_copied);
        }
    } else {
        println!("✗ Build failed with {} errors:", stats.errors.len());
        for error in &stats.errors {
            println!("  → {}", error);
        }
        std::process::exit(1);
    }
}
