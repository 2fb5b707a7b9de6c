//! Sequential Barabási–Albert preferential attachment graph generator.

use std::path::PathBuf;

use clap::{CommandFactory, Parser};
use rand::SeedableRng;
use rand_pcg::Pcg64Mcg;

use pagg::{
    gens::{Ba, EdgesPerVertexGen, NumNodesGen},
    io::EdgeWriter,
    stream::{EdgeFilter, EdgeSorter},
};

#[derive(Parser)]
#[command(about = "Barabasi-Albert preferential attachment graph generator")]
struct Args {
    /// Path to output file
    filename: PathBuf,

    /// Number of random vertices; positive
    no_vertices: u64,

    /// Edges per random vertex; positive
    edges_per_vert: u64,

    /// Dependencies between edges of the same vertex
    #[arg(short = 'd', long)]
    edge_dependencies: bool,

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

    if args.no_vertices == 0 || args.edges_per_vert == 0 {
        eprintln!("no-vertices and edges-per-vert must be positive");
        Args::command().print_help().ok();
        std::process::exit(-1);
    }

    if let Err(e) = run(&args) {
        eprintln!("generation failed: {e}");
        std::process::exit(1);
    }
}

fn run(args: &Args) -> std::io::Result<()> {
    let ba = Ba::new()
        .nodes(args.no_vertices)
        .edges_per_vertex(args.edges_per_vert)
        .edge_dependencies(args.edge_dependencies);

    let rng = &mut Pcg64Mcg::from_os_rng();

    let mut writer = EdgeWriter::new(&args.filename, ba.total_edges())?;

    if args.filter_self_loops || args.filter_multi_edges {
        let sorted = EdgeSorter::new(ba.vertex_stream(rng));
        let filtered =
            EdgeFilter::new(sorted, args.filter_self_loops, args.filter_multi_edges);
        writer.write_edges(filtered)?;
    } else {
        writer.write_vertices(ba.vertex_stream(rng))?;
    }

    let edges = writer.finish()?;
    println!("Wrote {edges} edges");

    Ok(())
}
