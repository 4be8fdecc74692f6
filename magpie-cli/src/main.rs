use clap::Command;

mod cmd;

#[tokio::main]
async fn main() {
    let matches = Command::new("magpie")
        .about("Convention-based static site generator")
        .version(env!("CARGO_PKG_VERSION"))
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(cmd::build::make_subcommand())
        .subcommand(cmd::serve::make_subcommand())
        .subcommand(cmd::new::make_subcommand())
        .get_matches();

    let result = match matches.subcommand() {
        Some(("build", args)) => cmd::build::execute(args),
        Some(("serve", args)) => cmd::serve::execute(args).await,
        Some(("new", args)) => cmd::new::execute(args),
        _ => unreachable!("subcommand required"),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
