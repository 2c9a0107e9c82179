//! Static per-level spatial index: BSP point location, blockmap broad-phase,
//! reject visibility and sector adjacency.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::blockmap::{Blockmap, MAX_BLOCKMAP_CELLS};
use crate::error::{MapError, MapResult};
use crate::geometry::{Aabb, Side, point_on_side};
use crate::map::{Linedef, MapData, NodeChild, Sector};
use crate::reject::Reject;

/// Hard cap on BSP descent, independent of the node count.
pub const MAX_BSP_DEPTH: usize = 4096;

/// Floor and ceiling heights at a point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SectorHeights {
    /// Floor height.
    pub floor: f32,
    /// Ceiling height.
    pub ceiling: f32,
}

/// Vertical opening through a two-sided line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Opening {
    /// Lower of the two ceilings.
    pub top: f32,
    /// Higher of the two floors.
    pub bottom: f32,
}

impl Opening {
    /// Passable height; negative when the planes overlap.
    pub fn gap(&self) -> f32 {
        self.top - self.bottom
    }
}

/// A loaded level with its lookup structures.
///
/// Owns the [`MapData`]; sector heights stay mutable through
/// [`MapIndex::sector_mut`], everything else is fixed after [`MapIndex::new`].
#[derive(Debug, Clone)]
pub struct MapIndex {
    map: MapData,
    blockmap: Blockmap,
    reject: Option<Reject>,
    neighbors: Vec<Vec<usize>>,
    malformed: usize,
}

impl MapIndex {
    /// Index a decoded map.
    ///
    /// Builds the blockmap when absent or inconsistent, drops an undersized
    /// reject table and counts dangling references. Only a map with no
    /// sectors is rejected outright.
    pub fn new(mut map: MapData) -> MapResult<Self> {
        if map.sectors.is_empty() {
            return Err(MapError::NoSectors(map.name.clone()));
        }
        if let Some(index) = map
            .vertices
            .iter()
            .position(|v| !(v.x.is_finite() && v.y.is_finite()))
        {
            return Err(MapError::NonFiniteVertex {
                map: map.name.clone(),
                index,
            });
        }

        let blockmap = match map.blockmap.take() {
            Some(bm) if bm.cells.len() == bm.cell_count() && bm.cell_count() <= MAX_BLOCKMAP_CELLS => bm,
            Some(bm) => {
                warn!(
                    map = %map.name,
                    declared = bm.cell_count(),
                    actual = bm.cells.len(),
                    "blockmap shape mismatch, rebuilding"
                );
                Blockmap::build(&map)?
            }
            None => Blockmap::build(&map)?,
        };

        let sector_count = map.sectors.len();
        let reject = match map.reject.take() {
            Some(r) if r.bits.len() >= Reject::required_bytes(sector_count) => Some(r),
            Some(r) => {
                warn!(
                    map = %map.name,
                    bytes = r.bits.len(),
                    needed = Reject::required_bytes(sector_count),
                    "reject table too short, ignoring it"
                );
                None
            }
            None => None,
        };

        let malformed = count_malformed(&map);
        if malformed > 0 {
            warn!(map = %map.name, malformed, "map has dangling references");
        }

        let mut neighbors = vec![Vec::new(); sector_count];
        for line in 0..map.linedefs.len() {
            if let (Some(front), Some(back)) = map.line_sectors(line) {
                if front != back {
                    neighbors[front].push(back);
                    neighbors[back].push(front);
                }
            }
        }
        for list in &mut neighbors {
            list.sort_unstable();
            list.dedup();
        }

        info!(
            map = %map.name,
            sectors = sector_count,
            linedefs = map.linedefs.len(),
            nodes = map.nodes.len(),
            "map indexed"
        );

        Ok(Self {
            map,
            blockmap,
            reject,
            neighbors,
            malformed,
        })
    }

    /// The underlying map.
    pub fn map(&self) -> &MapData {
        &self.map
    }

    /// Level name.
    pub fn name(&self) -> &str {
        &self.map.name
    }

    /// All sectors.
    pub fn sectors(&self) -> &[Sector] {
        &self.map.sectors
    }

    /// A sector by index.
    pub fn sector(&self, index: usize) -> Option<&Sector> {
        self.map.sectors.get(index)
    }

    /// Mutable access for plane movers.
    pub fn sector_mut(&mut self, index: usize) -> Option<&mut Sector> {
        self.map.sectors.get_mut(index)
    }

    /// A linedef by index.
    pub fn linedef(&self, index: usize) -> Option<&Linedef> {
        self.map.linedefs.get(index)
    }

    /// Number of linedefs.
    pub fn linedef_count(&self) -> usize {
        self.map.linedefs.len()
    }

    /// Start and end of a linedef.
    pub fn line_endpoints(&self, line: usize) -> Option<(Vec2, Vec2)> {
        self.map.line_endpoints(line)
    }

    /// Front and back sector of a linedef.
    pub fn line_sectors(&self, line: usize) -> (Option<usize>, Option<usize>) {
        self.map.line_sectors(line)
    }

    /// The broad-phase grid.
    pub fn blockmap(&self) -> &Blockmap {
        &self.blockmap
    }

    /// Whether a reject table is in use.
    pub fn has_reject(&self) -> bool {
        self.reject.is_some()
    }

    /// Count of dangling references found at load.
    pub fn malformed_references(&self) -> usize {
        self.malformed
    }

    /// Subsector containing `point`.
    ///
    /// Traversal visits at most `nodes.len() + 1` nodes (and never more than
    /// [`MAX_BSP_DEPTH`]), which bounds any well-formed tree and stops
    /// cycles in a corrupt one.
    pub fn find_subsector(&self, point: Vec2) -> Option<usize> {
        let nodes = &self.map.nodes;
        if nodes.is_empty() {
            return (!self.map.subsectors.is_empty()).then_some(0);
        }

        let mut index = nodes.len() - 1;
        for _ in 0..=nodes.len().min(MAX_BSP_DEPTH) {
            let Some(node) = nodes.get(index) else {
                debug!(node = index, "BSP child points past the node array");
                return None;
            };
            let child = match point_on_side(point, node.origin(), node.direction()) {
                Side::Front => node.right,
                Side::Back => node.left,
            };
            match child {
                NodeChild::Subsector(ss) => {
                    return (ss < self.map.subsectors.len()).then_some(ss);
                }
                NodeChild::Node(next) => index = next,
            }
        }
        warn!(map = %self.map.name, "BSP traversal hit depth cap");
        None
    }

    /// Sector enclosing `point`, resolved through the leaf's first seg.
    pub fn find_sector(&self, point: Vec2) -> Option<usize> {
        let ss = self.find_subsector(point)?;
        let subsector = self.map.subsectors.get(ss)?;
        if subsector.seg_count == 0 {
            return None;
        }
        self.map.seg_sector(subsector.first_seg)
    }

    /// Heights of the sector enclosing `point`.
    pub fn heights_at(&self, point: Vec2) -> Option<SectorHeights> {
        let sector = self.sector(self.find_sector(point)?)?;
        Some(SectorHeights {
            floor: sector.floor_height,
            ceiling: sector.ceiling_height,
        })
    }

    /// Candidate linedefs overlapping `area`. Broad-phase only.
    pub fn query_block(&self, area: Aabb) -> Vec<usize> {
        self.blockmap.query(area)
    }

    /// Vertical opening through a two-sided line.
    pub fn opening(&self, line: usize) -> Option<Opening> {
        let (Some(front), Some(back)) = self.line_sectors(line) else {
            return None;
        };
        let front = self.sector(front)?;
        let back = self.sector(back)?;
        Some(Opening {
            top: front.ceiling_height.min(back.ceiling_height),
            bottom: front.floor_height.max(back.floor_height),
        })
    }

    /// Sectors sharing a two-sided line with `sector`.
    pub fn neighbors(&self, sector: usize) -> &[usize] {
        self.neighbors.get(sector).map_or(&[], Vec::as_slice)
    }

    /// Lowest ceiling among neighbouring sectors.
    pub fn lowest_neighbor_ceiling(&self, sector: usize) -> Option<f32> {
        self.neighbors(sector)
            .iter()
            .filter_map(|&s| self.sector(s))
            .map(|s| s.ceiling_height)
            .min_by(f32::total_cmp)
    }

    /// Lowest floor among neighbouring sectors.
    pub fn lowest_neighbor_floor(&self, sector: usize) -> Option<f32> {
        self.neighbors(sector)
            .iter()
            .filter_map(|&s| self.sector(s))
            .map(|s| s.floor_height)
            .min_by(f32::total_cmp)
    }

    /// Sectors carrying `tag`, in index order.
    pub fn sectors_with_tag(&self, tag: u16) -> Vec<usize> {
        self.map
            .sectors
            .iter()
            .enumerate()
            .filter(|(_, s)| s.tag == tag)
            .map(|(i, _)| i)
            .collect()
    }

    /// Whether anything in sector `to` may be visible from sector `from`.
    pub fn can_see(&self, from: usize, to: usize) -> bool {
        match &self.reject {
            Some(reject) => !reject.is_rejected(self.map.sectors.len(), from, to),
            None => true,
        }
    }

    /// Visit subsectors nearest-first as seen from `view`.
    pub fn walk_front_to_back(&self, view: Vec2, mut visit: impl FnMut(usize)) {
        let nodes = &self.map.nodes;
        if nodes.is_empty() {
            if !self.map.subsectors.is_empty() {
                visit(0);
            }
            return;
        }

        let budget = nodes.len() + self.map.subsectors.len() + 1;
        let mut stack = vec![NodeChild::Node(nodes.len() - 1)];
        let mut steps = 0;
        while let Some(child) = stack.pop() {
            steps += 1;
            if steps > budget {
                warn!(map = %self.map.name, "BSP walk exceeded its visit budget");
                return;
            }
            match child {
                NodeChild::Subsector(ss) => {
                    if ss < self.map.subsectors.len() {
                        visit(ss);
                    }
                }
                NodeChild::Node(n) => {
                    let Some(node) = nodes.get(n) else {
                        continue;
                    };
                    let (near, far) = match point_on_side(view, node.origin(), node.direction()) {
                        Side::Front => (node.right, node.left),
                        Side::Back => (node.left, node.right),
                    };
                    stack.push(far);
                    stack.push(near);
                }
            }
        }
    }
}

fn count_malformed(map: &MapData) -> usize {
    let vertex_ok = |v: usize| v < map.vertices.len();
    let sidedef_ok = |sd: usize| map.sidedef_sector(sd).is_some();

    let lines = map
        .linedefs
        .iter()
        .filter(|l| {
            !vertex_ok(l.start)
                || !vertex_ok(l.end)
                || !sidedef_ok(l.right_sidedef)
                || l.left_sidedef.is_some_and(|sd| !sidedef_ok(sd))
        })
        .count();
    let segs = map
        .segs
        .iter()
        .filter(|s| s.linedef >= map.linedefs.len() || !vertex_ok(s.start) || !vertex_ok(s.end))
        .count();
    let child_ok = |c: NodeChild| match c {
        NodeChild::Node(n) => n < map.nodes.len(),
        NodeChild::Subsector(s) => s < map.subsectors.len(),
    };
    let nodes = map
        .nodes
        .iter()
        .filter(|n| !child_ok(n.right) || !child_ok(n.left))
        .count();
    let subsectors = map
        .subsectors
        .iter()
        .filter(|ss| {
            ss.first_seg
                .checked_add(ss.seg_count)
                .is_none_or(|end| end > map.segs.len())
        })
        .count();
    lines + segs + nodes + subsectors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{Room, RowMapBuilder};
    use crate::map::{Node, Seg, Sidedef, Subsector, Vertex};

    fn three_rooms() -> MapIndex {
        RowMapBuilder::new(0.0, 128.0)
            .room(Room::new(128.0, 0.0, 128.0))
            .room(Room::new(64.0, 8.0, 96.0).tag(3))
            .room(Room::new(128.0, 0.0, 160.0))
            .build("ROW3")
            .unwrap()
    }

    #[test]
    fn far_away_vertex_is_an_error_not_a_panic() {
        let mut data = RowMapBuilder::new(0.0, 128.0)
            .room(Room::new(128.0, 0.0, 128.0))
            .build_data("FAR");
        data.vertices.push(Vertex::new(1.0e7, 1.0e7));
        let err = MapIndex::new(data).unwrap_err();
        assert!(matches!(err, MapError::BlockmapTooLarge { .. }));
    }

    #[test]
    fn non_finite_vertex_is_rejected() {
        let mut data = RowMapBuilder::new(0.0, 128.0)
            .room(Room::new(128.0, 0.0, 128.0))
            .build_data("NAN");
        let index = data.vertices.len();
        data.vertices.push(Vertex::new(f32::NAN, 0.0));
        let err = MapIndex::new(data).unwrap_err();
        assert!(matches!(err, MapError::NonFiniteVertex { index: i, .. } if i == index));
    }

    #[test]
    fn oversized_declared_blockmap_is_rebuilt() {
        let mut data = three_rooms().map().clone();
        data.blockmap = Some(Blockmap {
            origin: Vec2::ZERO,
            columns: 2048,
            rows: 1024,
            cells: Vec::new(),
        });
        let index = MapIndex::new(data).unwrap();
        assert!(index.blockmap().cell_count() <= MAX_BLOCKMAP_CELLS);
        assert_eq!(index.find_sector(Vec2::new(64.0, 64.0)), Some(0));
    }

    #[test]
    fn find_sector_picks_room_under_point() {
        let index = three_rooms();
        assert_eq!(index.find_sector(Vec2::new(64.0, 64.0)), Some(0));
        assert_eq!(index.find_sector(Vec2::new(160.0, 64.0)), Some(1));
        assert_eq!(index.find_sector(Vec2::new(300.0, 10.0)), Some(2));
    }

    #[test]
    fn heights_at_reports_sector_planes() {
        let index = three_rooms();
        let h = index.heights_at(Vec2::new(160.0, 64.0)).unwrap();
        assert_eq!(h.floor, 8.0);
        assert_eq!(h.ceiling, 96.0);
    }

    #[test]
    fn neighbors_follow_shared_lines() {
        let index = three_rooms();
        assert_eq!(index.neighbors(0), &[1]);
        assert_eq!(index.neighbors(1), &[0, 2]);
        assert_eq!(index.lowest_neighbor_ceiling(1), Some(128.0));
        assert_eq!(index.lowest_neighbor_floor(1), Some(0.0));
        assert!(index.neighbors(42).is_empty());
    }

    #[test]
    fn opening_uses_tightest_planes() {
        let index = three_rooms();
        let shared = (0..index.linedef_count())
            .find(|&l| index.line_sectors(l) == (Some(1), Some(0)))
            .unwrap();
        let opening = index.opening(shared).unwrap();
        assert_eq!(opening.top, 96.0);
        assert_eq!(opening.bottom, 8.0);
        assert_eq!(opening.gap(), 88.0);
    }

    #[test]
    fn sectors_with_tag_finds_tagged() {
        let index = three_rooms();
        assert_eq!(index.sectors_with_tag(3), vec![1]);
        assert!(index.sectors_with_tag(9).is_empty());
    }

    #[test]
    fn walk_visits_near_subsector_first() {
        let index = three_rooms();
        let mut order = Vec::new();
        index.walk_front_to_back(Vec2::new(300.0, 64.0), |ss| order.push(ss));
        assert_eq!(order.len(), 3);
        assert_eq!(index.map().seg_sector(index.map().subsectors[order[0]].first_seg), Some(2));
        assert_eq!(index.map().seg_sector(index.map().subsectors[order[2]].first_seg), Some(0));
    }

    #[test]
    fn map_without_sectors_is_rejected() {
        let err = MapIndex::new(MapData::default()).unwrap_err();
        assert!(matches!(err, MapError::NoSectors(_)));
    }

    #[test]
    fn no_nodes_means_single_subsector() {
        let map = MapData {
            name: "ONE".into(),
            vertices: vec![Vertex::new(0.0, 0.0), Vertex::new(10.0, 0.0)],
            linedefs: vec![Linedef {
                start: 1,
                end: 0,
                flags: crate::map::LinedefFlags::BLOCKING,
                special: 0,
                tag: 0,
                right_sidedef: 0,
                left_sidedef: None,
            }],
            sidedefs: vec![Sidedef::facing(0)],
            sectors: vec![Sector::with_heights(0.0, 64.0)],
            segs: vec![Seg {
                start: 1,
                end: 0,
                angle: 0,
                linedef: 0,
                direction: 0,
                offset: 0.0,
            }],
            subsectors: vec![Subsector {
                seg_count: 1,
                first_seg: 0,
            }],
            ..MapData::default()
        };
        let index = MapIndex::new(map).unwrap();
        assert_eq!(index.find_sector(Vec2::new(-500.0, 900.0)), Some(0));
    }

    #[test]
    fn cyclic_tree_terminates_with_none() {
        let mut map = three_rooms().map().clone();
        for node in &mut map.nodes {
            node.right = NodeChild::Node(0);
            node.left = NodeChild::Node(0);
        }
        let index = MapIndex::new(map).unwrap();
        assert!(index.malformed_references() == 0);
        assert_eq!(index.find_sector(Vec2::new(10.0, 10.0)), None);
        let mut visited = 0;
        index.walk_front_to_back(Vec2::new(10.0, 10.0), |_| visited += 1);
        assert_eq!(visited, 0);
    }

    #[test]
    fn dangling_references_resolve_to_none() {
        let mut map = three_rooms().map().clone();
        map.sidedefs[0].sector = 500;
        map.nodes.push(Node {
            x: 0.0,
            y: 0.0,
            dx: 0.0,
            dy: 1.0,
            bbox_right: [0.0; 4],
            bbox_left: [0.0; 4],
            right: NodeChild::Subsector(900),
            left: NodeChild::Node(77),
        });
        let index = MapIndex::new(map).unwrap();
        assert!(index.malformed_references() >= 2);
        assert_eq!(index.find_sector(Vec2::new(10.0, 10.0)), None);
        assert_eq!(index.find_sector(Vec2::new(-10.0, 10.0)), None);
    }

    #[test]
    fn reject_table_controls_visibility() {
        let mut map = three_rooms().map().clone();
        let mut reject = Reject::permissive(3);
        reject.reject(3, 0, 2);
        map.reject = Some(reject);
        let index = MapIndex::new(map).unwrap();
        assert!(!index.can_see(0, 2));
        assert!(index.can_see(2, 0));
        assert!(index.has_reject());
    }

    #[test]
    fn short_reject_table_is_dropped() {
        let mut map = three_rooms().map().clone();
        map.reject = Some(Reject { bits: vec![0xFF] });
        let index = MapIndex::new(map).unwrap();
        assert!(!index.has_reject());
        assert!(index.can_see(0, 1));
    }

    #[test]
    fn bad_blockmap_is_rebuilt() {
        let mut map = three_rooms().map().clone();
        map.blockmap = Some(Blockmap {
            origin: Vec2::ZERO,
            columns: 4,
            rows: 4,
            cells: vec![Vec::new()],
        });
        let index = MapIndex::new(map).unwrap();
        assert_eq!(index.blockmap().cells.len(), index.blockmap().cell_count());
        assert!(!index.query_block(Aabb::around(Vec2::new(0.0, 64.0), 8.0)).is_empty());
    }
}
