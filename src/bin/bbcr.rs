//! Directed preferential attachment graph generator following
//! "Directed Scale-Free Graphs" by Bollobás, Borgs, Chayes and Riordan.

use std::path::PathBuf;

use clap::{CommandFactory, Parser};
use rand::SeedableRng;
use rand_pcg::Pcg64Mcg;

use pagg::{
    gens::{Bbcr, NumEdgesGen},
    io::EdgeWriter,
    stream::{EdgeFilter, EdgeSorter},
};

#[derive(Parser)]
#[command(about = "Directed preferential attachment graph generator (BBCR model)")]
struct Args {
    /// Path to output file
    filename: PathBuf,

    /// Number of random edges; positive
    no_edges: u64,

    /// Number of seed vertices; at least 2
    #[arg(short = 'n', long, default_value_t = 2)]
    seed_vertices: u64,

    /// Relative probability to add a new vertex with an outgoing edge
    #[arg(short = 'a', long, default_value_t = 0.1)]
    alpha: f64,

    /// Relative probability to link two existing vertices
    #[arg(short = 'b', long, default_value_t = 0.8)]
    beta: f64,

    /// Relative probability to add a new vertex with an incoming edge
    #[arg(short = 'g', long, default_value_t = 0.1)]
    gamma: f64,

    /// Non-negative offset of the in-degree distribution
    #[arg(short = 'y', long = "d-in", default_value_t = 0.0)]
    d_in: f64,

    /// Non-negative offset of the out-degree distribution
    #[arg(short = 'z', long = "d-out", default_value_t = 0.0)]
    d_out: f64,

    /// Remove all self-loops (without replacement)
    #[arg(short = 's', long)]
    filter_self_loops: bool,

    /// Collapse parallel edges into a single one
    #[arg(short = 'm', long)]
    filter_multi_edges: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let args = Args::parse();

    let model = Bbcr::new()
        .edges(args.no_edges)
        .seed_vertices(args.seed_vertices)
        .probabilities(args.alpha, args.beta, args.gamma)
        .degree_offsets(args.d_in, args.d_out);

    if let Err(e) = model.validate() {
        eprintln!("{e}");
        Args::command().print_help().ok();
        std::process::exit(-1);
    }

    if let Err(e) = run(&args, &model) {
        eprintln!("generation failed: {e}");
        std::process::exit(1);
    }
}

fn run(args: &Args, model: &Bbcr) -> std::io::Result<()> {
    let rng = &mut Pcg64Mcg::from_os_rng();

    let mut writer = EdgeWriter::new(&args.filename, model.total_edges())?;

    if args.filter_self_loops || args.filter_multi_edges {
        let sorted = EdgeSorter::new(model.vertex_stream(rng));
        let filtered =
            EdgeFilter::new(sorted, args.filter_self_loops, args.filter_multi_edges);
        writer.write_edges(filtered)?;
    } else {
        writer.write_vertices(model.vertex_stream(rng))?;
    }

    let edges = writer.finish()?;
    println!("Wrote {edges} edges");

    Ok(())
}
