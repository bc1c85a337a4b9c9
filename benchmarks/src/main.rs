use anyhow::{ensure, Context, Result};
use clap::Parser;
use common::collision_detection::rectangle_rectangle;
use common::shapes::Rectangle;
use fxhash::FxHashMap;
use linear_quadtree::{Config, QuadtreeError, RecordId, SpatialIndex};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

const BOUNDS_VELOCITY_LOSS: f32 = 0.99;

#[derive(Parser, Debug)]
#[command(author, version, about = "Moving-object simulation over a linear quadtree")]
struct Args {
    /// Number of moving objects
    #[arg(long, env = "LQT_OBJECTS", default_value_t = 2000)]
    objects: usize,
    /// Simulation ticks to run
    #[arg(long, env = "LQT_TICKS", default_value_t = 500)]
    ticks: usize,
    /// Subdivision depth of the index
    #[arg(long, env = "LQT_LEVEL", default_value_t = 6)]
    level: u32,
    /// Side length of the square arena
    #[arg(long, env = "LQT_ARENA", default_value_t = 10_000.0)]
    arena: f32,
    #[arg(long, env = "LQT_SEED", default_value_t = 0x5eed)]
    seed: u64,
    /// Smallest object side
    #[arg(long, env = "LQT_MIN_SIZE", default_value_t = 16.0)]
    min_size: f32,
    /// Largest object side
    #[arg(long, env = "LQT_MAX_SIZE", default_value_t = 256.0)]
    max_size: f32,
    /// Initial speed cap per axis, in arena units per tick
    #[arg(long, env = "LQT_SPEED", default_value_t = 4.0)]
    speed: f32,
    /// Count contacts without pushing objects apart
    #[arg(long, env = "LQT_NO_RESOLVE")]
    no_resolve: bool,
}

#[derive(Clone, Copy, Debug)]
struct Entity {
    bounds: Rectangle,
    vx: f32,
    vy: f32,
}

#[derive(Default)]
struct TickTotals {
    collide: Duration,
    update: Duration,
    relocate: Duration,
    candidates: usize,
    contacts: usize,
    rejected: usize,
}

fn generate_entities(args: &Args, playfield: &Rectangle) -> Vec<Entity> {
    let mut rng = StdRng::seed_from_u64(args.seed);
    (0..args.objects)
        .map(|_| {
            let w = rng.gen_range(args.min_size..=args.max_size);
            let h = rng.gen_range(args.min_size..=args.max_size);
            Entity {
                bounds: playfield.random_rectangle_inside(w, h, &mut rng),
                vx: rng.gen_range(-args.speed..=args.speed),
                vy: rng.gen_range(-args.speed..=args.speed),
            }
        })
        .collect()
}

fn update_entity(entity: &mut Entity, playfield: &Rectangle) {
    let bounds = &mut entity.bounds;
    bounds.translate(entity.vx, entity.vy);

    if bounds.left < playfield.left {
        bounds.translate(playfield.left - bounds.left, 0.0);
        entity.vx = entity.vx.abs() * BOUNDS_VELOCITY_LOSS;
    } else if bounds.right > playfield.right {
        bounds.translate(playfield.right - bounds.right, 0.0);
        entity.vx = -entity.vx.abs() * BOUNDS_VELOCITY_LOSS;
    }

    if bounds.top < playfield.top {
        bounds.translate(0.0, playfield.top - bounds.top);
        entity.vy = entity.vy.abs() * BOUNDS_VELOCITY_LOSS;
    } else if bounds.bottom > playfield.bottom {
        bounds.translate(0.0, playfield.bottom - bounds.bottom);
        entity.vy = -entity.vy.abs() * BOUNDS_VELOCITY_LOSS;
    }
}

/// Pushes two overlapping objects apart along the shallower axis and
/// exchanges their velocity on that axis, weighted by area.
fn collide_entities(a: &mut Entity, b: &mut Entity) {
    let diff_x = a.bounds.center_x() - b.bounds.center_x();
    let diff_y = a.bounds.center_y() - b.bounds.center_y();
    let overlap_x = (a.bounds.width() + b.bounds.width()) * 0.5 - diff_x.abs();
    let overlap_y = (a.bounds.height() + b.bounds.height()) * 0.5 - diff_y.abs();
    if overlap_x <= 0.0 || overlap_y <= 0.0 {
        return;
    }

    let size_a = a.bounds.width() * a.bounds.height();
    let size_b = b.bounds.width() * b.bounds.height();
    let total = size_a + size_b;
    if total <= 0.0 {
        return;
    }

    if overlap_x < overlap_y {
        let sign = if diff_x > 0.0 { 1.0 } else { -1.0 };
        a.bounds.translate(sign * overlap_x * (size_b / total), 0.0);
        b.bounds.translate(-sign * overlap_x * (size_a / total), 0.0);
        let va = a.vx;
        a.vx = (a.vx * (size_a - size_b) + 2.0 * size_b * b.vx) / total;
        b.vx = (b.vx * (size_b - size_a) + 2.0 * size_a * va) / total;
    } else {
        let sign = if diff_y > 0.0 { 1.0 } else { -1.0 };
        a.bounds.translate(0.0, sign * overlap_y * (size_b / total));
        b.bounds.translate(0.0, -sign * overlap_y * (size_a / total));
        let va = a.vy;
        a.vy = (a.vy * (size_a - size_b) + 2.0 * size_b * b.vy) / total;
        b.vy = (b.vy * (size_b - size_a) + 2.0 * size_a * va) / total;
    }
}

fn resolve_pair(entities: &mut [Entity], a: usize, b: usize) {
    if a == b {
        return;
    }
    let (low, high) = (a.min(b), a.max(b));
    let (head, tail) = entities.split_at_mut(high);
    collide_entities(&mut head[low], &mut tail[0]);
}

fn duration_ms(duration: Duration) -> f64 {
    duration.as_secs_f64() * 1000.0
}

fn run(args: &Args) -> Result<()> {
    ensure!(args.objects > 0, "at least one object is required");
    ensure!(
        args.min_size > 0.0 && args.min_size <= args.max_size,
        "object sizes must satisfy 0 < min ({}) <= max ({})",
        args.min_size,
        args.max_size
    );
    ensure!(
        args.max_size < args.arena,
        "objects ({}) must be smaller than the arena ({})",
        args.max_size,
        args.arena
    );

    let mut index = SpatialIndex::new_with_config(
        Rectangle::new(0.0, 0.0, args.arena, args.arena),
        Config {
            level: args.level,
            pool_size: args.objects,
        },
    )
    .context("building spatial index")?;

    // The far edge belongs to no leaf, keep objects half a leaf inside it.
    let margin = index.region().unit_width() * 0.5;
    let playfield = Rectangle::new(0.0, 0.0, args.arena - margin, args.arena - margin);
    ensure!(
        args.max_size <= playfield.width(),
        "objects ({}) do not fit inside the playfield ({})",
        args.max_size,
        playfield.width()
    );

    let mut entities = generate_entities(args, &playfield);
    let ids: Vec<RecordId> = entities
        .iter()
        .enumerate()
        .map(|(value, entity)| -> Result<RecordId> {
            let id = index.add_record(value);
            index
                .register(id, &entity.bounds)
                .with_context(|| format!("registering object {value}"))?;
            Ok(id)
        })
        .collect::<Result<_>>()?;
    info!(
        objects = ids.len(),
        level = index.level(),
        leaf_side = index.region().leaf_side(),
        cells = index.cell_count(),
        live_cells = index.live_cell_count(),
        "index populated"
    );

    let mut totals = TickTotals::default();
    let mut contacts_per_object: FxHashMap<usize, u32> = FxHashMap::default();

    for tick in 0..args.ticks {
        let start = Instant::now();
        let pairs = index.all_pairs();
        let candidates = pairs.len();
        let mut contacts = 0;
        for (&a, &b) in pairs {
            if !rectangle_rectangle(&entities[a].bounds, &entities[b].bounds) {
                continue;
            }
            contacts += 1;
            *contacts_per_object.entry(a).or_default() += 1;
            *contacts_per_object.entry(b).or_default() += 1;
            if !args.no_resolve {
                resolve_pair(&mut entities, a, b);
            }
        }
        totals.collide += start.elapsed();
        totals.candidates += candidates;
        totals.contacts += contacts;

        let start = Instant::now();
        for entity in entities.iter_mut() {
            update_entity(entity, &playfield);
        }
        totals.update += start.elapsed();

        let start = Instant::now();
        for (id, entity) in ids.iter().zip(&entities) {
            match index.relocate(*id, &entity.bounds) {
                Ok(()) => {}
                Err(err @ QuadtreeError::OutOfRange { .. }) => {
                    warn!(%id, %err, "object left the index region");
                    totals.rejected += 1;
                }
                Err(err) => return Err(err).with_context(|| format!("relocating {id}")),
            }
        }
        totals.relocate += start.elapsed();

        debug!(
            tick,
            candidates,
            contacts,
            live_cells = index.live_cell_count(),
            "tick complete"
        );
    }

    let ticks = args.ticks.max(1) as f64;
    info!(
        ticks = args.ticks,
        collide_ms = duration_ms(totals.collide) / ticks,
        update_ms = duration_ms(totals.update) / ticks,
        relocate_ms = duration_ms(totals.relocate) / ticks,
        "mean tick timings"
    );
    info!(
        candidates = totals.candidates,
        contacts = totals.contacts,
        rejected = totals.rejected,
        touched_objects = contacts_per_object.len(),
        "broad phase summary"
    );
    if totals.candidates > 0 {
        info!(
            "narrow phase hit rate: {:.02}%",
            100.0 * totals.contacts as f64 / totals.candidates as f64
        );
    }
    if let Some((object, count)) = contacts_per_object
        .iter()
        .max_by_key(|(object, count)| (**count, std::cmp::Reverse(**object)))
    {
        info!(object, count, "busiest object");
    }
    Ok(())
}

/// `RUST_LOG` directives when set and valid, `info` otherwise.
fn env_filter(directives: Option<String>) -> EnvFilter {
    directives
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new("info"))
}

fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(env_filter(std::env::var(EnvFilter::DEFAULT_ENV).ok()))
        .init();

    debug!(?args, "starting simulation");
    run(&args)
}
