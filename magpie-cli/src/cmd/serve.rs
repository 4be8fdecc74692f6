use anyhow::Result;
use clap::{Arg, ArgMatches, Command};
use magpie_core::Project;
use magpie_dev_server::{DevServer, DevServerConfig};

pub fn make_subcommand() -> Command {
    Command::new("serve")
        .about("Start the development server with live reload")
        .arg(
            Arg::new("root")
                .short('r')
                .long("root")
                .value_name("DIR")
                .help("Project root directory")
                .default_value("."),
        )
        .arg(
            Arg::new("port")
                .short('p')
                .long("port")
                .value_name("PORT")
                .help("Port to serve on")
                .value_parser(clap::value_parser!(u16))
                .default_value("4000"),
        )
        .arg(
            Arg::new("host")
                .long("host")
                .value_name("HOST")
                .help("Host to bind to")
                .default_value("127.0.0.1"),
        )
        .arg(
            Arg::new("open")
                .long("open")
                .help("Open browser automatically")
                .action(clap::ArgAction::SetTrue),
        )
}

pub async fn execute(args: &ArgMatches) -> Result<()> {
    let root = args.get_one::<String>("root").expect("has default");
    let project = Project::new(root);

    if !project.exists() {
        eprintln!("✗ No site directory found. Run this command from a .site directory.");
        std::process::exit(1);
    }

    let config = DevServerConfig {
        host: args.get_one::<String>("host").expect("has default").clone(),
        port: *args.get_one::<u16>("port").expect("has default"),
        open: args.get_flag("open"),
    };

    DevServer::new(project, config).run().await
}
