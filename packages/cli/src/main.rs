use clap::Parser;

use recordfetch_cli::{init_logging, run, Args};

fn main() {
    let args = Args::parse();
    init_logging(args.log_format);

    if let Err(e) = run(&args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
