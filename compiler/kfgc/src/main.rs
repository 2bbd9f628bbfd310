//! Flow-graph decoder CLI.

use kfgc::commands::{decode_file, dump_strings, encode_demo, parse_decode_options};

fn main() {
    kfgc::init_tracing();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        return;
    }

    let command = &args[1];

    match command.as_str() {
        "decode" => {
            if args.len() < 3 {
                eprintln!("Usage: kfgc decode <unit.kbin> [options]");
                eprintln!();
                eprintln!("Options:");
                eprintln!("  --offset=<n>     Decode the node at offset n (repeatable; default: all)");
                eprintln!("  --background     Decode on parallel background tasks");
                eprintln!("  --jobs=<n>       Background worker threads");
                eprintln!("  --catch=<n>      Decode inside a catch block with try index n");
                eprintln!("  --initializer    Decode as a one-shot static initializer");
                eprintln!("  --stats          Print compiler and cache statistics");
                eprintln!("  -v, --verbose    Verbose output");
                std::process::exit(1);
            }
            let options = parse_decode_options(&args[3..]);
            decode_file(&args[2], &options);
        }
        "strings" => {
            if args.len() < 3 {
                eprintln!("Usage: kfgc strings <unit.kbin>");
                std::process::exit(1);
            }
            dump_strings(&args[2]);
        }
        "encode-demo" => {
            if args.len() < 3 {
                eprintln!("Usage: kfgc encode-demo <out.kbin>");
                std::process::exit(1);
            }
            encode_demo(&args[2]);
        }
        "help" | "--help" | "-h" => print_usage(),
        _ => {
            eprintln!("Unknown command: {command}");
            eprintln!();
            print_usage();
            std::process::exit(1);
        }
    }
}

fn print_usage() {
    println!("kfgc - binary kernel to flow-graph decoder");
    println!();
    println!("Usage: kfgc <command> [options]");
    println!();
    println!("Commands:");
    println!("  decode <unit.kbin>       Build fragments for nodes of a unit");
    println!("  strings <unit.kbin>      Dump the unit's string pool");
    println!("  encode-demo <out.kbin>   Write a small demo unit");
    println!("  help                     Show this message");
    println!();
    println!("Set RUST_LOG (e.g. RUST_LOG=kfg_flow=debug) for decoder tracing.");
}
