// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! CLI tool: run the visibility, batching and picking pipeline on a sample
//! mesh and print a JSON summary.
//!
//! Usage:
//!   meshview-probe <cube|hex|tet|tet-pair> [options]
//!
//! Scene options are read from the JSON file named by `MESHVIEW_OPTIONS`
//! when set.

use anyhow::{bail, Context, Result};
use meshview_grid::{builders, ElementKey, ElementKind, Grid};
use meshview_scene::{
    DrawToggles, GuiRect, MeshObject, ObjectId, Scene, SceneOptions, MAX_CLIP_PLANES,
};
use nalgebra::{Point3, Vector3};
use serde::Serialize;
use std::env;

#[derive(Debug, Serialize)]
struct Report {
    object: String,
    rendered: Counts,
    boundary_faces: usize,
    batches: Vec<BatchReport>,
    near: f64,
    far: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pick: Option<PickReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    rect: Option<RectReport>,
}

#[derive(Debug, Serialize)]
struct Counts {
    vertices: usize,
    edges: usize,
    faces: usize,
    volumes: usize,
}

#[derive(Debug, Serialize)]
struct BatchReport {
    kind: String,
    mode: String,
    commands: usize,
}

#[derive(Debug, Serialize)]
struct PickReport {
    vertex: Option<[f64; 3]>,
    edge: Option<[f64; 3]>,
    face: Option<[f64; 3]>,
    volume: Option<[f64; 3]>,
}

#[derive(Debug, Serialize)]
struct RectReport {
    kind: String,
    contained: usize,
    intersecting: usize,
}

struct Args {
    mesh: String,
    clips: Vec<(usize, Point3<f64>, Vector3<f64>)>,
    toggles: Option<DrawToggles>,
    camera: Option<(Point3<f64>, Point3<f64>)>,
    pick: Option<(f64, f64)>,
    rect: Option<GuiRect>,
    rect_kind: ElementKind,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            env::var("RUST_LOG").unwrap_or_else(|_| "info,meshview_scene=debug".into()),
        )
        .pretty()
        .init();

    let argv: Vec<String> = env::args().collect();
    if argv.len() < 2 || argv[1] == "--help" || argv[1] == "-h" {
        print_usage();
        return Ok(());
    }
    let args = parse_args(&argv[1..])?;

    let options = SceneOptions::from_env()?;
    let mut scene = Scene::new(options)?;
    let grid = sample_mesh(&args.mesh)?;
    let id = scene.add_object(MeshObject::with_single_subset(args.mesh.clone(), grid));

    if let Some(toggles) = args.toggles {
        scene.set_draw_toggles(toggles);
    }
    for &(index, point, normal) in &args.clips {
        scene.set_clip_plane(index, point, normal)?;
        scene.enable_clip_plane(index, true)?;
    }

    let (from, to) = args.camera.unwrap_or_else(|| default_view(&scene));
    scene.camera_mut().look_at(from, to, up_for(from, to))?;
    let near_far = scene.estimate_near_far(from, to)?;
    if near_far.far > near_far.near {
        scene.camera_mut().set_near_far(near_far.near, near_far.far)?;
    } else {
        tracing::warn!(near = near_far.near, far = near_far.far, "scene lies behind the camera");
    }

    let report = build_report(&scene, id, &args, near_far.near, near_far.far)?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn build_report(scene: &Scene, id: ObjectId, args: &Args, near: f64, far: f64) -> Result<Report> {
    let object = scene.object(id).context("object vanished")?;
    let vis = scene.visibility(id).context("no visibility snapshot")?;
    let batches = scene.batches(id).context("no batch snapshot")?;
    let rendered = vis.rendered();

    let pick = match args.pick {
        Some((x, y)) => {
            let ray = scene
                .camera()
                .ray_through(x, y)
                .context("camera cannot unproject this pixel")?;
            let grid = object.grid();
            Some(PickReport {
                vertex: centroid_of(grid, scene.pick_vertex(id, &ray).map(ElementKey::Vertex)),
                edge: centroid_of(grid, scene.pick_edge(id, &ray, false).map(ElementKey::Edge)),
                face: centroid_of(grid, scene.pick_face(id, &ray).map(ElementKey::Face)),
                volume: centroid_of(grid, scene.pick_volume(id, &ray).map(ElementKey::Volume)),
            })
        }
        None => None,
    };

    let rect = args.rect.map(|rect| RectReport {
        kind: format!("{:?}", args.rect_kind),
        contained: scene.query_rect_contained(id, args.rect_kind, &rect).len(),
        intersecting: scene.query_rect_intersecting(id, args.rect_kind, &rect).len(),
    });

    Ok(Report {
        object: object.name().to_string(),
        rendered: Counts {
            vertices: rendered.count(ElementKind::Vertex),
            edges: rendered.count(ElementKind::Edge),
            faces: rendered.count(ElementKind::Face),
            volumes: rendered.count(ElementKind::Volume),
        },
        boundary_faces: vis.boundary_faces().len(),
        batches: batches
            .batches()
            .iter()
            .map(|b| BatchReport {
                kind: format!("{:?}", b.kind),
                mode: format!("{:?}", b.mode),
                commands: b.len(),
            })
            .collect(),
        near,
        far,
        pick,
        rect,
    })
}

fn centroid_of(grid: &Grid, key: Option<ElementKey>) -> Option<[f64; 3]> {
    let c = grid.element_centroid(key?)?;
    Some([c.x, c.y, c.z])
}

fn sample_mesh(name: &str) -> Result<Grid> {
    let grid = match name {
        "cube" => builders::unit_cube()?,
        "hex" => builders::hexahedron()?,
        "tet" => builders::tetrahedron()?,
        "tet-pair" => builders::tetrahedron_pair()?,
        other => bail!("unknown mesh '{other}' (expected cube, hex, tet or tet-pair)"),
    };
    Ok(grid)
}

/// Looks at the scene center from +z, far enough to see the whole sphere.
fn default_view(scene: &Scene) -> (Point3<f64>, Point3<f64>) {
    let (center, radius) = scene
        .bounding_sphere()
        .map_or((Point3::origin(), 1.0), |s| (s.center, s.radius.max(1e-3)));
    (center + Vector3::z() * radius * 4.0, center)
}

fn up_for(from: Point3<f64>, to: Point3<f64>) -> Vector3<f64> {
    let dir = to - from;
    if dir.cross(&Vector3::y()).norm() > 1e-9 * dir.norm() {
        Vector3::y()
    } else {
        Vector3::z()
    }
}

fn parse_args(args: &[String]) -> Result<Args> {
    let mut parsed = Args {
        mesh: args[0].clone(),
        clips: Vec::new(),
        toggles: None,
        camera: None,
        pick: None,
        rect: None,
        rect_kind: ElementKind::Face,
    };

    let mut i = 1;
    let next = |i: &mut usize, what: &str| -> Result<String> {
        *i += 1;
        args.get(*i)
            .cloned()
            .with_context(|| format!("missing value for {what}"))
    };

    while i < args.len() {
        match args[i].as_str() {
            "--clip" => {
                let index: usize = next(&mut i, "--clip index")?.parse()?;
                if index >= MAX_CLIP_PLANES {
                    bail!("clip plane index must be below {MAX_CLIP_PLANES}");
                }
                let point = parse_triple(&next(&mut i, "--clip point")?)?;
                let normal = parse_triple(&next(&mut i, "--clip normal")?)?;
                parsed
                    .clips
                    .push((index, Point3::from(point), normal));
            }
            "--toggles" => {
                parsed.toggles = Some(parse_toggles(&next(&mut i, "--toggles")?)?);
            }
            "--camera" => {
                let from = parse_triple(&next(&mut i, "--camera from")?)?;
                let to = parse_triple(&next(&mut i, "--camera to")?)?;
                parsed.camera = Some((Point3::from(from), Point3::from(to)));
            }
            "--pick" => {
                let x = next(&mut i, "--pick x")?.parse()?;
                let y = next(&mut i, "--pick y")?.parse()?;
                parsed.pick = Some((x, y));
            }
            "--rect" => {
                let mut c = [0.0; 4];
                for (n, v) in c.iter_mut().enumerate() {
                    *v = next(&mut i, &format!("--rect corner {n}"))?.parse()?;
                }
                parsed.rect = Some(GuiRect::new(c[0], c[1], c[2], c[3]));
            }
            "--kind" => {
                parsed.rect_kind = match next(&mut i, "--kind")?.as_str() {
                    "vertex" => ElementKind::Vertex,
                    "edge" => ElementKind::Edge,
                    "face" => ElementKind::Face,
                    "volume" => ElementKind::Volume,
                    other => bail!("unknown element kind '{other}'"),
                };
            }
            other => bail!("unknown option '{other}'"),
        }
        i += 1;
    }
    Ok(parsed)
}

fn parse_triple(s: &str) -> Result<Vector3<f64>> {
    let parts = s
        .split(',')
        .map(|p| p.trim().parse::<f64>())
        .collect::<std::result::Result<Vec<_>, _>>()
        .with_context(|| format!("invalid coordinate triple '{s}'"))?;
    match parts.as_slice() {
        [x, y, z] => Ok(Vector3::new(*x, *y, *z)),
        _ => bail!("expected three comma-separated numbers, got '{s}'"),
    }
}

/// Letters `v`, `e`, `f`, `c` switch on vertices, edges, faces and volumes.
fn parse_toggles(s: &str) -> Result<DrawToggles> {
    let mut toggles = DrawToggles::new(false, false, false, false);
    for ch in s.chars() {
        match ch {
            'v' => toggles.vertices = true,
            'e' => toggles.edges = true,
            'f' => toggles.faces = true,
            'c' => toggles.volumes = true,
            other => bail!("unknown toggle '{other}' (expected v, e, f or c)"),
        }
    }
    Ok(toggles)
}

fn print_usage() {
    eprintln!("Usage: meshview-probe <cube|hex|tet|tet-pair> [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --clip <i> <px,py,pz> <nx,ny,nz>  Enable clip plane i (0..3)");
    eprintln!("  --toggles <vefc>                  Draw vertices/edges/faces/volumes");
    eprintln!("  --camera <fx,fy,fz> <tx,ty,tz>    Camera position and target");
    eprintln!("  --pick <x> <y>                    Pick under a GUI pixel");
    eprintln!("  --rect <x0> <y0> <x1> <y1>        Rectangle query in GUI pixels");
    eprintln!("  --kind <vertex|edge|face|volume>  Element kind for --rect");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  MESHVIEW_OPTIONS  Path to a JSON scene options file");
    eprintln!("  RUST_LOG          Log filter (default: info,meshview_scene=debug)");
}
