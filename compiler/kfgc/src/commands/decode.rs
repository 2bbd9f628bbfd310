//! The `decode` command: build fragments for nodes of a unit.

use rayon::prelude::*;

use kfg_flow::{
    CanonicalTable, Canonicalize, CatchBlock, CompilerStats, CompilerTask, DecodeFault,
    DecodeSession, Fragment, FunctionKind, LocalVariable, ParsedFunction, ScopeBuildingResult,
    SharedUnit, StreamingFlowGraphBuilder,
};

use super::load_unit;

/// Options for the `decode` command.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Node offsets to decode. Empty means every node in the stream.
    pub offsets: Vec<usize>,
    /// Background worker threads (default: rayon's global pool).
    pub jobs: Option<usize>,
    /// Decode on background tasks instead of the mutator.
    pub background: bool,
    /// Gather and print compiler statistics.
    pub stats: bool,
    /// Treat the body as a one-shot static initializer.
    pub initializer: bool,
    /// Decode inside a catch block with this try index.
    pub catch_try_index: Option<i32>,
    pub verbose: bool,
}

impl DecodeOptions {
    /// Merge another set of options into this one.
    ///
    /// Offsets accumulate; other fields take the new value if present.
    pub fn merge(&mut self, other: &Self) {
        self.offsets.extend_from_slice(&other.offsets);
        if other.jobs.is_some() {
            self.jobs = other.jobs;
        }
        if other.catch_try_index.is_some() {
            self.catch_try_index = other.catch_try_index;
        }
        self.background |= other.background;
        self.stats |= other.stats;
        self.initializer |= other.initializer;
        self.verbose |= other.verbose;
    }
}

/// Parse `decode` options from command-line arguments.
///
/// Unknown or malformed options are reported and ignored.
pub fn parse_decode_options(args: &[String]) -> DecodeOptions {
    let mut options = DecodeOptions::default();

    for arg in args {
        if let Some(offset) = arg.strip_prefix("--offset=") {
            match offset.parse() {
                Ok(offset) => options.offsets.push(offset),
                Err(_) => eprintln!("warning: invalid offset '{offset}', ignoring"),
            }
        } else if let Some(jobs) = arg.strip_prefix("--jobs=") {
            match jobs.parse() {
                Ok(0) | Err(_) => eprintln!("warning: invalid job count '{jobs}', ignoring"),
                Ok(jobs) => options.jobs = Some(jobs),
            }
        } else if let Some(index) = arg.strip_prefix("--catch=") {
            match index.parse() {
                Ok(index) => options.catch_try_index = Some(index),
                Err(_) => eprintln!("warning: invalid try index '{index}', ignoring"),
            }
        } else if arg == "--background" {
            options.background = true;
        } else if arg == "--stats" {
            options.stats = true;
        } else if arg == "--initializer" {
            options.initializer = true;
        } else if arg == "-v" || arg == "--verbose" {
            options.verbose = true;
        } else {
            eprintln!("warning: unknown option '{arg}'");
        }
    }

    options
}

/// One decoded node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodedNode {
    pub offset: usize,
    /// Offset just past the node.
    pub end: usize,
    pub fragment: Fragment,
}

/// Everything a `decode` run produced.
#[derive(Clone, Debug, Default)]
pub struct DecodeReport {
    pub nodes: Vec<DecodedNode>,
    /// Merged statistics of every task, when enabled.
    pub stats: Option<CompilerStats>,
    /// String-table entries scanned, summed over sessions.
    pub strings_scanned: usize,
}

impl DecodeReport {
    fn absorb(&mut self, task: &CompilerTask, strings_scanned: usize) {
        if let (Some(total), Some(stats)) = (&mut self.stats, task.stats()) {
            total.merge(stats);
        }
        self.strings_scanned += strings_scanned;
    }
}

/// Shared, read-only state for every task of one run.
struct DecodeContext<'c> {
    function: &'c ParsedFunction,
    scopes: &'c ScopeBuildingResult,
    catch_block: Option<&'c CatchBlock>,
    canon: &'c dyn Canonicalize,
    stats: bool,
}

impl<'c> DecodeContext<'c> {
    fn builder(&self, task: CompilerTask) -> StreamingFlowGraphBuilder<'c> {
        let task = if self.stats { task.with_stats() } else { task };
        let mut builder = StreamingFlowGraphBuilder::new(self.function, self.scopes, self.canon, task);
        builder.set_catch_block(self.catch_block);
        builder
    }

    fn report(&self) -> DecodeReport {
        DecodeReport {
            stats: self.stats.then(CompilerStats::default),
            ..DecodeReport::default()
        }
    }
}

/// Decode the requested nodes of `unit`.
///
/// On the mutator, nodes are built in order by one session and constants
/// populate the unit's cache. In background mode each node is built by its
/// own background task, in parallel, reading the cache only.
pub fn decode_unit(unit: &SharedUnit, options: &DecodeOptions) -> Result<DecodeReport, DecodeFault> {
    let canon = CanonicalTable::new();
    let kind = if options.initializer {
        FunctionKind::ImplicitStaticFinalGetter
    } else {
        FunctionKind::Regular
    };
    let function = ParsedFunction::new("main", kind, unit.clone());
    let scopes = ScopeBuildingResult::with_this(LocalVariable::new("this", 0));
    let catch_block = options.catch_try_index.map(|catch_try_index| CatchBlock {
        exception_var: LocalVariable::new(":exception", 1),
        stack_trace_var: LocalVariable::new(":stack_trace", 2),
        catch_try_index,
    });
    let context = DecodeContext {
        function: &function,
        scopes: &scopes,
        catch_block: catch_block.as_ref(),
        canon: &canon,
        stats: options.stats,
    };

    if options.background {
        decode_in_background(&context, &options.offsets, options.jobs)
    } else {
        decode_on_mutator(&context, &options.offsets)
    }
}

fn decode_on_mutator(
    context: &DecodeContext<'_>,
    offsets: &[usize],
) -> Result<DecodeReport, DecodeFault> {
    let mut builder = context.builder(CompilerTask::mutator());
    let mut report = context.report();

    report.nodes = if offsets.is_empty() {
        walk(&mut builder)?
    } else {
        offsets
            .iter()
            .map(|&offset| build(&mut builder, offset))
            .collect::<Result<_, _>>()?
    };

    report.absorb(builder.task(), builder.session().strings().entries_scanned());
    Ok(report)
}

fn decode_in_background(
    context: &DecodeContext<'_>,
    offsets: &[usize],
    jobs: Option<usize>,
) -> Result<DecodeReport, DecodeFault> {
    let mut report = context.report();

    let offsets = if offsets.is_empty() {
        // Node boundaries are only known by decoding. The walk finds them on
        // one task and is left out of the report; the parallel pass below
        // builds (and counts) every node.
        let mut builder = context.builder(CompilerTask::background());
        walk(&mut builder)?.iter().map(|node| node.offset).collect()
    } else {
        offsets.to_vec()
    };

    let decode = || {
        offsets
            .par_iter()
            .map(|&offset| {
                let mut builder = context.builder(CompilerTask::background());
                let node = build(&mut builder, offset)?;
                let scanned = builder.session().strings().entries_scanned();
                Ok((node, builder.into_task(), scanned))
            })
            .collect::<Result<Vec<_>, DecodeFault>>()
    };

    let results = match jobs {
        Some(jobs) => match rayon::ThreadPoolBuilder::new().num_threads(jobs).build() {
            Ok(pool) => pool.install(decode),
            Err(error) => {
                tracing::warn!(%error, "cannot build worker pool; using the global pool");
                decode()
            }
        },
        None => decode(),
    }?;

    for (node, task, scanned) in results {
        report.absorb(&task, scanned);
        report.nodes.push(node);
    }
    Ok(report)
}

fn build(builder: &mut StreamingFlowGraphBuilder<'_>, offset: usize) -> Result<DecodedNode, DecodeFault> {
    let fragment = builder.try_build_at(offset)?;
    Ok(DecodedNode {
        offset,
        end: builder.session().offset(),
        fragment,
    })
}

/// Build every node from the start of the node stream to the end of the unit.
fn walk(builder: &mut StreamingFlowGraphBuilder<'_>) -> Result<Vec<DecodedNode>, DecodeFault> {
    let bytes = builder.function().unit().bytes();
    let mut offset = DecodeSession::new(bytes).node_stream_start()?;
    let mut nodes = Vec::new();
    while offset < bytes.len() {
        let node = build(builder, offset)?;
        offset = node.end;
        nodes.push(node);
    }
    Ok(nodes)
}

/// Decode nodes of the unit at `path` and print their fragments.
pub fn decode_file(path: &str, options: &DecodeOptions) {
    let unit = load_unit(path);
    if options.verbose {
        let task = if options.background { "background tasks" } else { "the mutator" };
        eprintln!("decoding '{path}' ({} bytes) on {task}", unit.bytes().len());
    }

    let report = match decode_unit(&unit, options) {
        Ok(report) => report,
        Err(fault) => {
            eprintln!("error: internal compiler fault: {fault}");
            std::process::exit(1);
        }
    };

    for node in &report.nodes {
        if options.verbose {
            println!("node @{}..{}:", node.offset, node.end);
        } else {
            println!("node @{}:", node.offset);
        }
        print!("{}", node.fragment);
    }

    if let Some(stats) = &report.stats {
        let constants = unit.constants();
        println!();
        println!("{stats}");
        println!("string entries scanned: {}", report.strings_scanned);
        println!(
            "constant cache:       {} entries, generation {}",
            constants.len(),
            constants.generation()
        );
    }
}
