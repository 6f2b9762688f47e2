// build.rs

use clap::{Arg, ArgAction, Command};
use clap_mangen::Man;
use std::env;
use std::fs;
use std::path::PathBuf;

/// Common argument: path to the .dacpac package
fn package_arg() -> Arg {
    Arg::new("package")
        .required(true)
        .value_name("PACKAGE")
        .help("Path to the .dacpac package")
}

/// Common argument: target database file
fn target_arg() -> Arg {
    Arg::new("target")
        .required(true)
        .value_name("TARGET")
        .help("Path to the target SQLite database file")
}

/// Common argument: filename-based identity key
fn namekey_arg() -> Arg {
    Arg::new("namekey")
        .long("namekey")
        .action(ArgAction::SetTrue)
        .help("Derive the identity key from the package file name instead of a path digest")
}

fn build_cli() -> Command {
    Command::new("dacskip")
        .version(env!("CARGO_PKG_VERSION"))
        .author("Dacskip Contributors")
        .about("Deployment guard for dacpac packages: skip deployments already applied to the target database")
        .subcommand_required(true)
        .subcommand(
            Command::new("check")
                .about("Check whether a package has already been deployed (exit 0 yes, 1 no)")
                .arg(package_arg())
                .arg(target_arg())
                .arg(namekey_arg()),
        )
        .subcommand(
            Command::new("mark")
                .about("Record the package fingerprint in the target database")
                .arg(package_arg())
                .arg(target_arg())
                .arg(namekey_arg()),
        )
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    // Create man directory - use CARGO_MANIFEST_DIR which is always set by cargo
    let manifest_dir = match env::var("CARGO_MANIFEST_DIR") {
        Ok(dir) => PathBuf::from(dir),
        Err(e) => {
            println!("cargo:warning=CARGO_MANIFEST_DIR not set: {}", e);
            return;
        }
    };
    let man_dir = manifest_dir.join("man");

    if let Err(e) = fs::create_dir_all(&man_dir) {
        println!("cargo:warning=Failed to create man directory: {}", e);
        return;
    }

    let cmd = build_cli();
    let man = Man::new(cmd);
    let mut buffer = Vec::new();

    if let Err(e) = man.render(&mut buffer) {
        println!("cargo:warning=Failed to render man page: {}", e);
        return;
    }

    let man_path = man_dir.join("dacskip.1");
    if let Err(e) = fs::write(&man_path, buffer) {
        println!("cargo:warning=Failed to write man page: {}", e);
    }
}
