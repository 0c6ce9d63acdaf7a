//! The skin pipeline: load, merge, skin, tag, write.

use std::path::Path;
use std::time::{Duration, Instant};

use hexmesh::io::{load_mesh, write_mesh};
use hexmesh::mesh::{ElementId, Mesh, Sense, SetKind};
use hexmesh::ops::merge::merge_with;
use hexmesh::ops::skin::{find_skin_with, Skin, SkinOptions};
use tracing::{debug, info};

use crate::args::Args;
use crate::error::SkinError;

/// What a run produced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Report {
    /// Dimension of the skin facets.
    pub dimension: usize,
    pub facets: usize,
    pub vertices: usize,
    pub merged: usize,
    /// Wall time of each phase, in run order.
    pub timings: Vec<(&'static str, Duration)>,
}

impl Report {
    /// The `-l` summary line.
    pub fn summary(&self) -> String {
        let noun = if self.dimension == 1 { "edges" } else { "faces" };
        format!("Skin has {} {} and {} vertices.", self.facets, noun, self.vertices)
    }
}

struct Phases {
    start: Instant,
    timings: Vec<(&'static str, Duration)>,
}

impl Phases {
    fn new() -> Self {
        Self {
            start: Instant::now(),
            timings: Vec::new(),
        }
    }

    fn lap(&mut self, phase: &'static str) {
        let now = Instant::now();
        self.timings.push((phase, now - self.start));
        debug!(phase, elapsed = ?(now - self.start), "phase done");
        self.start = now;
    }
}

pub fn run(args: &Args) -> Result<Report, SkinError> {
    if args.write_whole && args.output.is_none() {
        return Err(SkinError::Usage("-w needs an output file".to_string()));
    }

    let mut phases = Phases::new();
    let mut mesh = load_mesh(&args.input)?;
    phases.lap("load");

    let mut merged = 0;
    if let Some(options) = args.merge_options() {
        merged = merge_with(&mut mesh, &options)?.merged;
        phases.lap("merge");
    }

    let selection = select(&mesh, &args.blocks)?;
    let options = SkinOptions::new()
        .with_reverse(args.sideset.is_some())
        .with_strategy(args.strategy())
        .with_create_facets(args.sideset.is_some() || args.output.is_some());
    let skin = find_skin_with(&mut mesh, &selection, &options)?;
    let vertices = skin.vertices();
    phases.lap("skin");

    if let Some(name) = args.skin_tag() {
        let tags = mesh.tags_mut();
        tags.create(name, Some(0));
        for &vertex in &vertices {
            tags.set_vertex(name, vertex, 1);
        }
        info!(tag = name, vertices = vertices.len(), "tagged skin vertices");
    }
    if let Some(id) = args.sideset {
        write_sidesets(&mut mesh, id, &skin)?;
    }

    if let Some(output) = &args.output {
        write_output(&mesh, &skin, output, args.write_whole)?;
        phases.lap("write");
    }

    Ok(Report {
        dimension: skin.dimension,
        facets: skin.len(),
        vertices: vertices.len(),
        merged,
        timings: phases.timings,
    })
}

/// Elements to skin: the given material sets, or every element of the
/// highest dimension present.
fn select(mesh: &Mesh, blocks: &[i32]) -> Result<Vec<ElementId>, SkinError> {
    if !blocks.is_empty() {
        return Ok(mesh.set_elements(SetKind::Material, blocks)?);
    }
    Ok(mesh
        .max_dimension()
        .map(|dim| mesh.elements_of_dimension(dim))
        .unwrap_or_default())
}

/// Forward facets go into sideset `id`; reverse facets, if any, into a
/// second set with the same id and reverse sense.
fn write_sidesets(mesh: &mut Mesh, id: i32, skin: &Skin) -> Result<(), SkinError> {
    mesh.add_set(SetKind::Neumann, id, skin.entities(Sense::Forward))?;
    let reverse = skin.entities(Sense::Reverse);
    if !reverse.is_empty() {
        mesh.add_reversed_set(SetKind::Neumann, id, reverse)?;
    }
    Ok(())
}

fn write_output(mesh: &Mesh, skin: &Skin, path: &Path, whole: bool) -> Result<(), SkinError> {
    if whole {
        write_mesh(mesh, path)?;
    } else {
        let facets: Vec<ElementId> = skin.facets().filter_map(|facet| facet.entity).collect();
        write_mesh(&mesh.extract(&facets)?, path)?;
    }
    Ok(())
}
