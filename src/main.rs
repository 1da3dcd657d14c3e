use std::{
    fs::File,
    io::{BufWriter, Write},
    path::PathBuf,
};

use anyhow::Context;
use clap::{CommandFactory, FromArgMatches, Parser};
use log::{error, info, warn};
use owo_colors::OwoColorize;
use trapmap::{QueryPoint, TrapezoidalMap, load_scene_from_file};

#[derive(Parser)]
struct Cli {
    /// Input file: segment count, bounding box, then one segment per line.
    input: PathBuf,
    /// Where to write the adjacency-matrix dump.
    #[arg(long, default_value = "output.txt")]
    output: PathBuf,
    /// Also write a timestamped listing of the built structure.
    #[arg(long)]
    debug_dump: bool,
}

fn parse_or_readline() -> anyhow::Result<Cli> {
    // Args were provided (try to parse, exit on fail)
    if std::env::args_os().len() > 1 {
        return Ok(Cli::parse());
    }

    let mut cmd = Cli::command().no_binary_name(true);

    println!("No CLI arguments were provided");
    println!("Specify arguments via stdin:");
    println!("{}", cmd.render_long_help());

    std::io::stdout().flush().context("could not write to stdout")?;
    let mut buffer = String::new();
    std::io::stdin().read_line(&mut buffer).context("could not read stdin")?;

    let args = shlex::split(buffer.trim()).context("invalid quoting")?;
    let matches = cmd.try_get_matches_from(args).context("failed to parse args")?;

    Cli::from_arg_matches(&matches).context("failed to parse args")
}

fn main() -> anyhow::Result<()> {
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let args = parse_or_readline()?;
    let run_timestamp = chrono::Utc::now().format(r"%y%m%d_%H%M%S");

    let scene = load_scene_from_file(&args.input)?;
    info!("{} segment(s) in {}", scene.segments.len(), scene.bbox);

    let mut map = TrapezoidalMap::new(scene.bbox);
    for seg in &scene.segments {
        match map.insert(*seg) {
            Ok(sid) => info!(target: "build", "S{}: {seg}", sid.get() + 1),
            Err(err) => error!(target: "build", "skipping {seg}: {err}"),
        }
    }
    for (kind, count) in map.node_stats() {
        info!(target: "build", "{kind}s: {count}");
    }

    {
        let file = File::create(&args.output)
            .with_context(|| format!("failed to create {}", args.output.display()))?;
        let mut writer = BufWriter::new(file);
        map.export_adjacency(&mut writer)?;
        writer.flush()?;
        info!("Wrote adjacency matrix to {}", args.output.display());
    }

    if args.debug_dump {
        let path = format!("{run_timestamp}_structure.log");
        info!("Writing structure listing to {path}");
        let mut file = File::create_new(&path)?;
        write_structure(&map, &mut file)?;
    }

    prompt_loop(&map)
}

fn write_structure<W: Write>(map: &TrapezoidalMap, w: &mut W) -> anyhow::Result<()> {
    for (ix, node) in map.dag().iter() {
        writeln!(w, "{ix:?} {node:?}")?;
    }
    for t_ix in map.live_trapezoids() {
        let t = map.trapezoid(t_ix);
        writeln!(
            w,
            "{t_ix:?} left {} right {} top [{}] bottom [{}]",
            t.left_p(),
            t.right_p(),
            t.top(),
            t.bottom()
        )?;
    }
    Ok(())
}

/// Reads query points until told to quit. A malformed line is logged and the
/// prompt keeps going.
fn prompt_loop(map: &TrapezoidalMap) -> anyhow::Result<()> {
    let stdin = std::io::stdin();
    let mut buffer = String::new();
    loop {
        print!("query> ");
        std::io::stdout().flush().context("could not write to stdout")?;

        buffer.clear();
        if stdin.read_line(&mut buffer).context("could not read stdin")? == 0 {
            return Ok(());
        }
        let line = buffer.trim();
        match line {
            "quit" | "q" | "exit" | "e" => return Ok(()),
            "" => continue,
            _ => {}
        }

        let parsed: Result<Vec<f64>, _> = line.split_whitespace().map(str::parse).collect();
        let pt = match parsed.as_deref() {
            Ok(&[x, y]) => QueryPoint::new(x, y),
            _ => {
                warn!("expected two numbers, got {line:?}");
                continue;
            }
        };

        let path = map.path_to(pt);
        let leaf = path.last().expect("path always ends at a leaf");
        println!("{pt} is in {}", leaf.green().bold());
        println!("  {path}");
    }
}
