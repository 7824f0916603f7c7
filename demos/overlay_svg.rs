use std::{path::PathBuf, str::FromStr};

use anyhow::{anyhow, bail};
use clap::Parser;
use svg::{
    node::element::{path::Data, Circle, Path},
    Document,
};

use snapround::{geom::Envelope, BooleanOp, Geometry, Overlay, Point, Polygon, PrecisionModel};

#[derive(Copy, Clone, Debug)]
struct Op(BooleanOp);

impl FromStr for Op {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "union" => Ok(Op(BooleanOp::Union)),
            "intersection" => Ok(Op(BooleanOp::Intersection)),
            "xor" => Ok(Op(BooleanOp::SymDifference)),
            "difference" => Ok(Op(BooleanOp::Difference)),
            _ => Err(format!("unknown op {s}")),
        }
    }
}

/// Overlays two polygon sets and draws the result.
///
/// The input is a text file with one ring per line. Each line starts with `a`
/// or `b` (which input the ring belongs to) followed by whitespace-separated
/// `x,y` pairs. A line starting with `a-` or `b-` is a hole in the most recent
/// shell of that input.
#[derive(Parser)]
struct Args {
    input: PathBuf,
    output: PathBuf,

    #[arg(long, default_value = "union")]
    op: Op,

    #[arg(long, default_value_t = 1.0)]
    scale: f64,

    /// Also mark every vertex of the result.
    #[arg(long)]
    vertices: bool,
}

fn parse_ring(words: &[&str]) -> anyhow::Result<Vec<(f64, f64)>> {
    words
        .iter()
        .map(|w| -> anyhow::Result<(f64, f64)> {
            let (x, y) = w
                .split_once(',')
                .ok_or_else(|| anyhow!("expected x,y, got {w}"))?;
            Ok((x.trim().parse()?, y.trim().parse()?))
        })
        .collect()
}

fn parse_input(text: &str) -> anyhow::Result<[Geometry; 2]> {
    let mut geoms = [Geometry::empty(), Geometry::empty()];
    for (line_no, line) in text.lines().enumerate() {
        let words: Vec<&str> = line.split_whitespace().collect();
        let Some((tag, coords)) = words.split_first() else {
            continue;
        };
        let ring = parse_ring(coords)?;
        let (idx, is_hole) = match *tag {
            "a" => (0, false),
            "b" => (1, false),
            "a-" => (0, true),
            "b-" => (1, true),
            _ => bail!("line {}: unknown tag {tag}", line_no + 1),
        };
        let geom = &mut geoms[idx];
        if is_hole {
            let hole = Polygon::from_coords(&ring, &[])?.shell;
            geom.polygons
                .last_mut()
                .ok_or_else(|| anyhow!("line {}: hole without a shell", line_no + 1))?
                .holes
                .push(hole);
        } else {
            geom.polygons.push(Polygon::from_coords(&ring, &[])?);
        }
    }
    Ok(geoms)
}

fn ring_data(mut data: Data, ring: &[Point]) -> Data {
    let mut pts = ring.iter().map(|p| (p.x.into_inner(), p.y.into_inner()));
    if let Some(first) = pts.next() {
        data = data.move_to(first);
        for p in pts {
            data = data.line_to(p);
        }
        data = data.close();
    }
    data
}

fn polygon_path(poly: &Polygon) -> Path {
    let data = poly.rings().fold(Data::new(), ring_data);
    Path::new().set("d", data).set("fill-rule", "evenodd")
}

pub fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let input = std::fs::read_to_string(&args.input)?;
    let [a, b] = parse_input(&input)?;
    let precision = PrecisionModel::new(args.scale)?;
    let overlay = Overlay::new(a, b, precision);
    let result = overlay.compute(args.op.0)?;
    eprintln!("{result}");

    let violations = overlay.check_noding();
    if !violations.is_empty() {
        eprintln!("{} noding violations", violations.len());
    }

    let [a, b] = overlay.inputs();
    let Some(env) = Envelope::of_points(a.points().chain(b.points())) else {
        bail!("both inputs are empty");
    };
    let pad = 2.0 * precision.grid_size();
    let stroke_width = (env.max_x - env.min_x).max(env.max_y - env.min_y) / 512.0;
    let mut document = Document::new().set(
        "viewBox",
        (
            env.min_x - pad,
            env.min_y - pad,
            env.max_x - env.min_x + 2.0 * pad,
            env.max_y - env.min_y + 2.0 * pad,
        ),
    );

    // Draw the inputs faintly underneath.
    for (geom, color) in [(a, "#005F73"), (b, "#AE2012")] {
        for poly in &geom.polygons {
            document = document.add(
                polygon_path(poly)
                    .set("fill", color)
                    .set("opacity", 0.2)
                    .set("stroke", "none"),
            );
        }
    }

    for poly in &result.polygons {
        document = document.add(
            polygon_path(poly)
                .set("fill", "#E9D8A6")
                .set("stroke", "black")
                .set("stroke-width", stroke_width)
                .set("stroke-linejoin", "round"),
        );
    }
    for line in &result.lines {
        let mut pts = line.iter().map(|p| (p.x.into_inner(), p.y.into_inner()));
        let Some(first) = pts.next() else {
            continue;
        };
        let data = pts.fold(Data::new().move_to(first), |d, p| d.line_to(p));
        document = document.add(
            Path::new()
                .set("d", data)
                .set("fill", "none")
                .set("stroke", "#EE9B00")
                .set("stroke-width", 2.0 * stroke_width),
        );
    }
    if args.vertices {
        for p in result.points() {
            document = document.add(
                Circle::new()
                    .set("cx", p.x.into_inner())
                    .set("cy", p.y.into_inner())
                    .set("r", 2.0 * stroke_width)
                    .set("fill", "black"),
            );
        }
    }

    svg::save(&args.output, &document)?;

    Ok(())
}
