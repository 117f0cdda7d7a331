use clap::{Arg, Command, CommandFactory};
use std::{env, fmt::Write, fs, path::Path};

fn main() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../docs/cli.md");
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, generate_markdown(&psvd::Args::command())).unwrap();
}

fn generate_markdown(cmd: &Command) -> String {
    let mut buffer = String::new();
    let name = cmd.get_name();

    let _ = writeln!(buffer, "# {} CLI\n", name.to_uppercase());
    let _ = writeln!(
        buffer,
        "This document contains cli reference for the `{name}` command-line program.\n"
    );

    if let Some(about) = cmd.get_long_about().or(cmd.get_about()) {
        let _ = writeln!(buffer, "{about}\n");
    }

    let _ = writeln!(buffer, "```\n{name} [OPTIONS]\n```\n");
    buffer.push_str("| Flag | Description |\n");
    buffer.push_str("|------|-------------|\n");

    for arg in cmd.get_arguments().filter(|x| !x.is_hide_set()) {
        write_option(&mut buffer, arg);
    }

    buffer
}

fn write_option(buffer: &mut String, arg: &Arg) {
    let mut flags = Vec::new();

    if let Some(short) = arg.get_short() {
        flags.push(format!("-{short}"));
    }

    if let Some(long) = arg.get_long() {
        flags.push(format!("--{long}"));
    }

    let mut help = arg
        .get_long_help()
        .or(arg.get_help())
        .map(|x| x.to_string())
        .unwrap_or_default();

    let values = arg
        .get_possible_values()
        .iter()
        .map(|x| x.get_name().to_owned())
        .collect::<Vec<_>>();

    if !values.is_empty() && values != ["true", "false"] {
        let _ = write!(help, "<br>*Possible values:* `{}`", values.join("`, `"));
    }

    if let Some(default) = arg.get_default_values().first() {
        if !arg.is_hide_default_value_set() {
            let _ = write!(help, "<br>*Default:* `{}`", default.to_string_lossy());
        }
    }

    if let Some(var) = arg.get_env() {
        let _ = write!(help, "<br>*Environment:* `{}`", var.to_string_lossy());
    }

    let help = help.replace('|', "\\|").replace('\n', "<br>");
    let _ = writeln!(buffer, "| `{}` | {} |", flags.join(", "), help);
}
