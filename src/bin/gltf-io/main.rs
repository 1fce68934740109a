//! glTF CLI - Tool for inspecting and converting glTF files.

use std::env;
use std::path::Path;
use std::process::ExitCode;

use anyhow::{bail, Context};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use gltf_io::flat::{flatten, unflatten, FlatScene};
use gltf_io::io::{is_binary_path, load, save, LoadOptions, SaveOptions};
use gltf_io::model::Asset;
use gltf_io::transform::walk;

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

fn main() -> ExitCode {
    let args: Vec<String> = env::args().collect();

    // Parse global flags
    let mut level = "info";
    let mut filtered_args: Vec<&str> = Vec::new();
    for arg in args.iter().skip(1) {
        match arg.as_str() {
            "-v" | "--verbose" => level = "debug",
            "-vv" | "--trace" => level = "trace",
            "-q" | "--quiet" => level = "warn",
            _ => filtered_args.push(arg),
        }
    }
    init_logging(level);

    if filtered_args.is_empty() {
        print_help();
        return ExitCode::SUCCESS;
    }

    match run(&filtered_args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn positional<'a>(args: &[&'a str], i: usize, usage: &str) -> anyhow::Result<&'a str> {
    match args.get(i) {
        Some(a) => Ok(*a),
        None => bail!("missing argument\nUsage: gltf-io {usage}"),
    }
}

fn run(args: &[&str]) -> anyhow::Result<()> {
    let arg = |i: usize, usage: &str| positional(args, i, usage);

    match args[0] {
        "info" | "i" => cmd_info(arg(1, "info <file>")?),
        "tree" | "t" => cmd_tree(arg(1, "tree <file>")?),
        "flatten" | "f" => {
            let path = arg(1, "flatten <file> [--json]")?;
            let json = args.iter().any(|&s| s == "--json" || s == "-j");
            cmd_flatten(path, json)
        }
        "convert" | "c" => {
            let usage = "convert <in> <out>";
            cmd_convert(arg(1, usage)?, arg(2, usage)?)
        }
        "roundtrip" | "r" => {
            let usage = "roundtrip <in> <out>";
            cmd_roundtrip(arg(1, usage)?, arg(2, usage)?)
        }
        "help" | "h" | "-h" | "--help" => {
            print_help();
            Ok(())
        }
        // Default: if file exists, show info; otherwise error
        other => {
            if Path::new(other).exists() {
                cmd_info(other)
            } else {
                print_help();
                bail!("unknown command: {other}")
            }
        }
    }
}

fn print_help() {
    println!("gltf-io - glTF 2.0 file toolkit");
    println!();
    println!("USAGE:");
    println!("    gltf-io [OPTIONS] <COMMAND> [ARGS]");
    println!();
    println!("COMMANDS:");
    println!("    i, info      <file>             Show asset info and object counts");
    println!("    t, tree      <file>             Show the node hierarchy");
    println!("    f, flatten   <file> [--json]    Flatten the default scene and summarize it");
    println!("    c, convert   <in> <out>         Re-save, choosing .gltf or .glb by extension");
    println!("    r, roundtrip <in> <out>         Flatten, rebuild and save");
    println!("    h, help                         Show this help");
    println!();
    println!("OPTIONS:");
    println!("    -v, --verbose    Show debug output");
    println!("    -vv, --trace     Show trace output (very verbose)");
    println!("    -q, --quiet      Only show warnings and errors");
    println!();
    println!("NOTES:");
    println!("    - Passing a file directly is equivalent to 'info'");
    println!("    - RUST_LOG overrides the verbosity flags");
}

fn open(path: &str, opts: &LoadOptions) -> anyhow::Result<Asset> {
    info!("Opening {}", path);
    load(path, opts).with_context(|| format!("failed to load {path}"))
}

fn cmd_info(path: &str) -> anyhow::Result<()> {
    let asset = open(path, &LoadOptions::default().with_skip_missing(true))?;

    println!("File: {}", path);
    println!("Version: {}", asset.asset.version);
    if let Some(g) = &asset.asset.generator {
        println!("Generator: {}", g);
    }
    if !asset.extensions_used.is_empty() {
        println!("Extensions: {}", asset.extensions_used.join(", "));
    }
    println!();

    let primitives: usize = asset.meshes.iter().map(|m| m.primitives.len()).sum();
    let buffer_bytes: usize = asset.buffers.iter().map(|b| b.byte_length).sum();
    println!("Objects:");
    println!("  Scenes:     {}", asset.scenes.len());
    println!("  Nodes:      {}", asset.nodes.len());
    println!("  Meshes:     {} ({} primitives)", asset.meshes.len(), primitives);
    println!("  Materials:  {}", asset.materials.len());
    println!("  Textures:   {} ({} images)", asset.textures.len(), asset.images.len());
    println!("  Cameras:    {}", asset.cameras.len());
    println!("  Skins:      {}", asset.skins.len());
    println!("  Animations: {}", asset.animations.len());
    println!("  Accessors:  {}", asset.accessors.len());
    println!("  Buffers:    {} ({} bytes)", asset.buffers.len(), buffer_bytes);

    let missing = asset.buffers.iter().filter(|b| b.byte_length > 0 && !b.is_loaded()).count();
    if missing > 0 {
        println!("  Missing:    {} buffers", missing);
    }

    match asset.validate() {
        Ok(()) => println!("\nValid: yes"),
        Err(e) => println!("\nValid: no ({e})"),
    }
    Ok(())
}

fn scene_roots(asset: &Asset) -> anyhow::Result<Vec<usize>> {
    match asset.scene.or(if asset.scenes.is_empty() { None } else { Some(0) }) {
        Some(s) => Ok(asset.scene(s)?.nodes.clone()),
        None => Ok(asset.root_nodes()),
    }
}

fn cmd_tree(path: &str) -> anyhow::Result<()> {
    let asset = open(path, &LoadOptions::topology_only())?;
    println!("File: {}", path);
    println!();

    let roots = scene_roots(&asset)?;
    walk(&asset, &roots, |v| {
        let node = &asset.nodes[v.node];
        let name = node.name.as_deref().unwrap_or("<unnamed>");
        let mut tags = Vec::new();
        if let Some(m) = node.mesh {
            tags.push(format!("mesh {m}"));
        }
        if let Some(c) = node.camera {
            tags.push(format!("camera {c}"));
        }
        if let Some(s) = node.skin {
            tags.push(format!("skin {s}"));
        }
        let indent = "  ".repeat(v.depth);
        if tags.is_empty() {
            println!("{}{} [{}]", indent, name, v.node);
        } else {
            println!("{}{} [{}] ({})", indent, name, v.node, tags.join(", "));
        }
        Ok(())
    })?;
    Ok(())
}

fn cmd_flatten(path: &str, json: bool) -> anyhow::Result<()> {
    let asset = open(path, &LoadOptions::default().with_skip_missing(true))?;
    let flat = flatten(&asset, None).context("flatten failed")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&flat)?);
        return Ok(());
    }
    print_flat_summary(&flat);
    Ok(())
}

fn print_flat_summary(flat: &FlatScene) {
    let vertices: usize = flat.primitives.iter().map(|p| p.pos.len()).sum();
    println!("Flat scene:");
    println!("  Cameras:    {}", flat.cameras.len());
    println!("  Materials:  {}", flat.materials.len());
    println!("  Textures:   {}", flat.textures.len());
    println!("  Primitives: {} ({} vertices)", flat.primitives.len(), vertices);
    println!("  Instances:  {}", flat.meshes.len());
    println!("  Triangles:  {}", flat.num_triangles());
    let b = flat.bounds();
    if !b.is_empty() {
        println!("  Bounds:     {:?} .. {:?}", b.min.to_array(), b.max.to_array());
    }
}

fn cmd_convert(input: &str, output: &str) -> anyhow::Result<()> {
    let asset = open(input, &LoadOptions::default())?;
    save(output, &asset, &SaveOptions::default()).with_context(|| format!("failed to save {output}"))?;
    info!("Wrote {}", output);
    Ok(())
}

fn cmd_roundtrip(input: &str, output: &str) -> anyhow::Result<()> {
    let asset = open(input, &LoadOptions::default())?;
    let flat = flatten(&asset, None).context("flatten failed")?;
    debug!("flattened {} primitives", flat.primitives.len());

    let out = Path::new(output);
    let stem = out.file_stem().and_then(|s| s.to_str()).unwrap_or("scene");
    let mut rebuilt = unflatten(&flat, stem).context("unflatten failed")?;
    if is_binary_path(out) {
        // Pack the geometry into the BIN chunk instead of a side file.
        if let Some(buffer) = rebuilt.buffers.first_mut() {
            buffer.uri = None;
        }
    }

    save(out, &rebuilt, &SaveOptions::default()).with_context(|| format!("failed to save {output}"))?;
    print_flat_summary(&flat);
    info!("Wrote {}", output);
    Ok(())
}
