use foundation::math::{Spherical, StorageRotation};
use tracing::{debug, warn};

use crate::asset::{Asset, IngestRequest};
use crate::connectivity::{self, RepairReport};
use crate::link::{LinkPosition, NavigationLink};
use crate::snapshot::SceneSnapshot;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    UnknownAsset { index: usize, len: usize },
    UnknownLink { index: usize, len: usize },
    SelfLink { index: usize },
}

impl std::fmt::Display for GraphError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GraphError::UnknownAsset { index, len } => {
                write!(f, "unknown asset index {index} (scene has {len} assets)")
            }
            GraphError::UnknownLink { index, len } => {
                write!(f, "unknown link index {index} (scene has {len} links)")
            }
            GraphError::SelfLink { index } => write!(f, "asset {index} cannot link to itself"),
        }
    }
}

impl std::error::Error for GraphError {}

/// Ordered panoramas plus the directed links between them.
///
/// Invariants after every public mutation:
/// - `assets[i].index == i`
/// - every link references existing assets and has a normalized position
/// - with two or more assets, every asset has an outgoing link and all
///   assets are forward-reachable from asset 0
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SceneGraph {
    assets: Vec<Asset>,
    links: Vec<NavigationLink>,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a graph from a persisted snapshot, repairing what it must.
    ///
    /// Asset indices are rewritten to their positions, links pointing at
    /// missing assets or at their own source are dropped, positions are
    /// clamped and rounded, then connectivity is repaired.
    pub fn from_snapshot(snapshot: SceneSnapshot) -> Self {
        Self::from_snapshot_with_report(snapshot).0
    }

    /// [`SceneGraph::from_snapshot`], also returning the links repair added.
    pub fn from_snapshot_with_report(snapshot: SceneSnapshot) -> (Self, RepairReport) {
        let SceneSnapshot { mut assets, navigation } = snapshot;

        for (position, asset) in assets.iter_mut().enumerate() {
            if asset.index != position {
                warn!(
                    stored = asset.index,
                    position, "asset index out of sequence; reindexing"
                );
                asset.index = position;
            }
        }

        let len = assets.len();
        let mut links = Vec::with_capacity(navigation.len());
        for mut link in navigation {
            if link.from_index >= len || link.to_index >= len || link.from_index == link.to_index {
                warn!(
                    from = link.from_index,
                    to = link.to_index,
                    assets = len,
                    "dropping invalid navigation link"
                );
                continue;
            }
            link.position = link.position.normalized();
            links.push(link);
        }

        let mut graph = Self { assets, links };
        let report = graph.ensure_connectivity();
        (graph, report)
    }

    pub fn snapshot(&self) -> SceneSnapshot {
        SceneSnapshot {
            assets: self.assets.clone(),
            navigation: self.links.clone(),
        }
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    pub fn assets(&self) -> &[Asset] {
        &self.assets
    }

    pub fn asset(&self, index: usize) -> Option<&Asset> {
        self.assets.get(index)
    }

    pub fn links(&self) -> &[NavigationLink] {
        &self.links
    }

    pub fn link(&self, index: usize) -> Option<&NavigationLink> {
        self.links.get(index)
    }

    /// Links leaving `asset`, with their index in [`SceneGraph::links`].
    pub fn links_from(&self, asset: usize) -> impl Iterator<Item = (usize, &NavigationLink)> + '_ {
        self.links
            .iter()
            .enumerate()
            .filter(move |(_, l)| l.from_index == asset)
    }

    pub fn out_degree(&self, asset: usize) -> usize {
        self.links_from(asset).count()
    }

    /// Assets reached by a forward breadth-first walk from asset 0.
    pub fn reachable_from_first(&self) -> Vec<usize> {
        let adjacency = connectivity::forward_adjacency(self.assets.len(), &self.links);
        connectivity::reachable_from(0, &adjacency)
    }

    /// Appends a new panorama with the next index and a zero rotation.
    pub fn add_asset(&mut self, request: IngestRequest) -> usize {
        let index = self.assets.len();
        self.assets.push(Asset::from_ingest(index, request));
        debug!(index, "asset added");
        self.ensure_connectivity();
        index
    }

    /// Removes an asset and every link touching it, then renumbers.
    pub fn remove_asset(&mut self, index: usize) -> Result<Asset, GraphError> {
        self.check_asset(index)?;

        let before = self.links.len();
        self.links.retain(|l| !l.touches(index));
        let removed = self.assets.remove(index);

        for (position, asset) in self.assets.iter_mut().enumerate() {
            asset.index = position;
        }
        let shift = |i: usize| if i > index { i - 1 } else { i };
        for link in &mut self.links {
            link.from_index = shift(link.from_index);
            link.to_index = shift(link.to_index);
        }

        debug!(
            index,
            cascaded = before - self.links.len(),
            "asset removed"
        );
        self.ensure_connectivity();
        Ok(removed)
    }

    /// Appends a link and returns its index.
    pub fn add_link(&mut self, link: NavigationLink) -> Result<usize, GraphError> {
        self.check_asset(link.from_index)?;
        self.check_asset(link.to_index)?;
        if link.from_index == link.to_index {
            return Err(GraphError::SelfLink {
                index: link.from_index,
            });
        }

        let mut link = link;
        link.position = link.position.normalized();
        let index = self.links.len();
        debug!(from = link.from_index, to = link.to_index, "link added");
        self.links.push(link);
        // Repair only appends, so `index` stays valid.
        self.ensure_connectivity();
        Ok(index)
    }

    pub fn remove_link(&mut self, index: usize) -> Result<NavigationLink, GraphError> {
        self.check_link(index)?;
        let removed = self.links.remove(index);
        debug!(from = removed.from_index, to = removed.to_index, "link removed");
        self.ensure_connectivity();
        Ok(removed)
    }

    /// Re-establishes the outgoing-link and reachability guarantees.
    pub fn ensure_connectivity(&mut self) -> RepairReport {
        let report = connectivity::repair(&self.assets, &mut self.links);
        if !report.is_empty() {
            debug!(
                outgoing = report.outgoing.len(),
                chained = report.chained.len(),
                "navigation graph repaired"
            );
        }
        report
    }

    pub fn set_asset_rotation(
        &mut self,
        index: usize,
        rotation: StorageRotation,
    ) -> Result<(), GraphError> {
        self.check_asset(index)?;
        self.assets[index].rotation = rotation;
        Ok(())
    }

    pub fn set_asset_title(&mut self, index: usize, title: impl Into<String>) -> Result<(), GraphError> {
        self.check_asset(index)?;
        self.assets[index].title = title.into();
        Ok(())
    }

    pub fn set_asset_description(
        &mut self,
        index: usize,
        description: impl Into<String>,
    ) -> Result<(), GraphError> {
        self.check_asset(index)?;
        self.assets[index].description = description.into();
        Ok(())
    }

    /// Moves a link's anchor, keeping its radius.
    pub fn set_link_position(&mut self, index: usize, position: Spherical) -> Result<(), GraphError> {
        self.check_link(index)?;
        let link = &mut self.links[index];
        let radius = link.position.radius;
        link.position = LinkPosition {
            radius,
            ..LinkPosition::from_spherical(position)
        };
        Ok(())
    }

    pub fn set_link_label(&mut self, index: usize, label: impl Into<String>) -> Result<(), GraphError> {
        self.check_link(index)?;
        self.links[index].label = label.into();
        Ok(())
    }

    pub fn set_link_description(
        &mut self,
        index: usize,
        description: impl Into<String>,
    ) -> Result<(), GraphError> {
        self.check_link(index)?;
        self.links[index].description = description.into();
        Ok(())
    }

    fn check_asset(&self, index: usize) -> Result<(), GraphError> {
        if index < self.assets.len() {
            Ok(())
        } else {
            Err(GraphError::UnknownAsset {
                index,
                len: self.assets.len(),
            })
        }
    }

    fn check_link(&self, index: usize) -> Result<(), GraphError> {
        if index < self.links.len() {
            Ok(())
        } else {
            Err(GraphError::UnknownLink {
                index,
                len: self.links.len(),
            })
        }
    }
}
