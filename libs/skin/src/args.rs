//! Command line arguments.

use std::path::PathBuf;

use clap::Parser;
use config::constants::DEFAULT_SKIN_TAG_NAME;
use hexmesh::ops::merge::MergeOptions;
use hexmesh::ops::skin::SkinStrategy;

#[derive(Debug, Parser)]
#[command(name = "skin")]
#[command(version, about = "Extract the skin of a hex mesh", long_about = None)]
pub struct Args {
    /// Skin only the elements of this material set (repeatable)
    #[arg(short = 'b', value_name = "BLOCK")]
    pub blocks: Vec<i32>,

    /// Find facets through vertex-element adjacency
    #[arg(short = 'a')]
    pub adjacency: bool,

    /// Merge coincident vertices first, with a distance derived from the
    /// shortest edge
    #[arg(short = 'm')]
    pub merge: bool,

    /// Merge coincident vertices closer than EPSILON first
    #[arg(short = 'M', value_name = "EPSILON")]
    pub merge_epsilon: Option<f64>,

    /// Print the time spent in each phase
    #[arg(short = 'p')]
    pub timings: bool,

    /// Write the skin into this sideset
    #[arg(short = 's', value_name = "SIDESET")]
    pub sideset: Option<i32>,

    /// Read the skin off structured blocks where possible
    #[arg(short = 'S')]
    pub structured: bool,

    /// Tag skin vertices with the "fixed" tag
    #[arg(short = 't', conflicts_with = "tag_name")]
    pub tag: bool,

    /// Tag skin vertices with NAME
    #[arg(short = 'T', value_name = "NAME")]
    pub tag_name: Option<String>,

    /// Write the whole mesh instead of only the skin
    #[arg(short = 'w')]
    pub write_whole: bool,

    /// Print the number of skin facets and vertices
    #[arg(short = 'l')]
    pub list: bool,

    /// Input mesh file
    pub input: PathBuf,

    /// Output mesh file
    pub output: Option<PathBuf>,
}

impl Args {
    /// Merge options, if merging was requested.
    pub fn merge_options(&self) -> Option<MergeOptions> {
        match self.merge_epsilon {
            Some(epsilon) => Some(MergeOptions::new().with_epsilon(epsilon)),
            None if self.merge => Some(MergeOptions::new()),
            None => None,
        }
    }

    /// Name of the skin vertex tag, if tagging was requested.
    pub fn skin_tag(&self) -> Option<&str> {
        match &self.tag_name {
            Some(name) => Some(name.as_str()),
            None if self.tag => Some(DEFAULT_SKIN_TAG_NAME),
            None => None,
        }
    }

    pub fn strategy(&self) -> SkinStrategy {
        if self.structured {
            SkinStrategy::Structured
        } else if self.adjacency {
            SkinStrategy::Adjacency
        } else {
            SkinStrategy::Hashed
        }
    }
}
