//! In-memory map structure handed over by the level decoder.
//!
//! Shapes are immutable after load; only [`Sector`] heights change at
//! runtime. Cross references are plain indices and may be out of range on a
//! corrupt map, so every accessor here returns `Option`.

use glam::Vec2;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::warn;

use crate::blockmap::Blockmap;
use crate::error::MapResult;
use crate::geometry::Aabb;
use crate::reject::Reject;

/// High bit of a raw BSP child index marking a subsector leaf.
pub const NF_SUBSECTOR: u16 = 0x8000;

bitflags::bitflags! {
    /// Linedef behaviour flags, bit-compatible with the level format.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct LinedefFlags: u16 {
        /// Blocks players and monsters.
        const BLOCKING = 0x0001;
        /// Blocks monsters only.
        const BLOCK_MONSTERS = 0x0002;
        /// Has a sidedef on both faces.
        const TWO_SIDED = 0x0004;
        /// Upper texture is pegged to the top.
        const UPPER_UNPEGGED = 0x0008;
        /// Lower texture is pegged to the bottom.
        const LOWER_UNPEGGED = 0x0010;
        /// Drawn as one-sided on the automap.
        const SECRET = 0x0020;
        /// Stops sound propagation.
        const BLOCK_SOUND = 0x0040;
        /// Never drawn on the automap.
        const NOT_ON_MAP = 0x0080;
        /// Drawn on the automap from the start.
        const ALREADY_ON_MAP = 0x0100;
    }
}

impl Serialize for LinedefFlags {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.bits().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for LinedefFlags {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        u16::deserialize(deserializer).map(Self::from_bits_retain)
    }
}

/// Map vertex.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vertex {
    /// X coordinate in map units.
    pub x: f32,
    /// Y coordinate in map units.
    pub y: f32,
}

impl Vertex {
    /// Create a vertex.
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Position as a vector.
    #[inline]
    pub fn pos(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }
}

/// A floor/ceiling area. The only map record mutated during play.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sector {
    /// Floor height.
    pub floor_height: f32,
    /// Ceiling height.
    pub ceiling_height: f32,
    /// Floor flat name.
    #[serde(default)]
    pub floor_texture: String,
    /// Ceiling flat name.
    #[serde(default)]
    pub ceiling_texture: String,
    /// Light level, 0..=255.
    #[serde(default)]
    pub light_level: u16,
    /// Sector special (damage floors, lighting effects).
    #[serde(default)]
    pub special: u16,
    /// Tag matched by linedef specials.
    #[serde(default)]
    pub tag: u16,
}

impl Sector {
    /// Sector with the given heights and no textures, tag or special.
    pub fn with_heights(floor_height: f32, ceiling_height: f32) -> Self {
        Self {
            floor_height,
            ceiling_height,
            floor_texture: String::new(),
            ceiling_texture: String::new(),
            light_level: 160,
            special: 0,
            tag: 0,
        }
    }

    /// Vertical space between floor and ceiling.
    pub fn clearance(&self) -> f32 {
        self.ceiling_height - self.floor_height
    }

    /// Whether the ceiling is open sky.
    pub fn is_sky_ceiling(&self) -> bool {
        self.ceiling_texture == "F_SKY1"
    }
}

/// Texture and offset record for one face of a linedef.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sidedef {
    /// Horizontal texture offset.
    #[serde(default)]
    pub x_offset: f32,
    /// Vertical texture offset.
    #[serde(default)]
    pub y_offset: f32,
    /// Upper wall texture.
    #[serde(default)]
    pub upper_texture: String,
    /// Lower wall texture.
    #[serde(default)]
    pub lower_texture: String,
    /// Middle wall texture.
    #[serde(default)]
    pub middle_texture: String,
    /// Sector this face borders.
    pub sector: usize,
}

impl Sidedef {
    /// Untextured sidedef facing `sector`.
    pub fn facing(sector: usize) -> Self {
        Self {
            x_offset: 0.0,
            y_offset: 0.0,
            upper_texture: String::new(),
            lower_texture: String::new(),
            middle_texture: String::new(),
            sector,
        }
    }
}

/// A directed wall between two vertices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Linedef {
    /// Start vertex index.
    pub start: usize,
    /// End vertex index.
    pub end: usize,
    /// Behaviour flags.
    #[serde(default)]
    pub flags: LinedefFlags,
    /// Special type triggered by use or walk-over; 0 for none.
    #[serde(default)]
    pub special: u16,
    /// Sector tag this line's special acts on.
    #[serde(default)]
    pub tag: u16,
    /// Sidedef on the right (front) face.
    pub right_sidedef: usize,
    /// Sidedef on the left (back) face, if any.
    #[serde(default)]
    pub left_sidedef: Option<usize>,
}

impl Linedef {
    /// Whether the line has a back face.
    #[inline]
    pub fn is_two_sided(&self) -> bool {
        self.left_sidedef.is_some()
    }

    /// Whether the blocking flag is set.
    #[inline]
    pub fn is_blocking(&self) -> bool {
        self.flags.contains(LinedefFlags::BLOCKING)
    }
}

/// A BSP wall fragment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Seg {
    /// Start vertex index.
    pub start: usize,
    /// End vertex index.
    pub end: usize,
    /// Angle in binary angle units as stored by the node builder.
    #[serde(default)]
    pub angle: u16,
    /// Owning linedef.
    pub linedef: usize,
    /// 0 when running the same way as the linedef, 1 when reversed.
    #[serde(default)]
    pub direction: u16,
    /// Distance along the linedef to the seg start.
    #[serde(default)]
    pub offset: f32,
}

/// A convex BSP leaf.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Subsector {
    /// Number of segs.
    pub seg_count: usize,
    /// Index of the first seg.
    pub first_seg: usize,
}

/// A BSP child: another node or a subsector leaf.
///
/// Decoded from the raw `u16` index where [`NF_SUBSECTOR`] marks a leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "u16", into = "u16")]
pub enum NodeChild {
    /// Index into the node array.
    Node(usize),
    /// Index into the subsector array.
    Subsector(usize),
}

impl From<u16> for NodeChild {
    fn from(raw: u16) -> Self {
        if raw & NF_SUBSECTOR != 0 {
            Self::Subsector((raw & !NF_SUBSECTOR) as usize)
        } else {
            Self::Node(raw as usize)
        }
    }
}

/// Largest index either child kind can carry in the raw `u16` form.
const MAX_CHILD_INDEX: u16 = !NF_SUBSECTOR;

/// Indices past [`MAX_CHILD_INDEX`] saturate to it with a warning.
impl From<NodeChild> for u16 {
    fn from(child: NodeChild) -> Self {
        let (index, leaf) = match child {
            NodeChild::Node(n) => (n, 0),
            NodeChild::Subsector(s) => (s, NF_SUBSECTOR),
        };
        let raw = u16::try_from(index)
            .ok()
            .filter(|&i| i <= MAX_CHILD_INDEX)
            .unwrap_or_else(|| {
                warn!(index, "BSP child index does not fit 15 bits, saturating");
                MAX_CHILD_INDEX
            });
        raw | leaf
    }
}

/// A BSP partition.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Partition line start X.
    pub x: f32,
    /// Partition line start Y.
    pub y: f32,
    /// Partition line direction X.
    pub dx: f32,
    /// Partition line direction Y.
    pub dy: f32,
    /// Bounding box of the right child as `[top, bottom, left, right]`.
    #[serde(default)]
    pub bbox_right: [f32; 4],
    /// Bounding box of the left child as `[top, bottom, left, right]`.
    #[serde(default)]
    pub bbox_left: [f32; 4],
    /// Child on the right (front) side of the partition.
    pub right: NodeChild,
    /// Child on the left (back) side of the partition.
    pub left: NodeChild,
}

impl Node {
    /// Partition origin.
    #[inline]
    pub fn origin(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    /// Partition direction.
    #[inline]
    pub fn direction(&self) -> Vec2 {
        Vec2::new(self.dx, self.dy)
    }
}

/// A thing placement from the level's spawn list.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThingSpawn {
    /// X position.
    pub x: f32,
    /// Y position.
    pub y: f32,
    /// Facing in degrees, 0 = east.
    #[serde(default)]
    pub angle: f32,
    /// Editor number identifying the thing type.
    pub doomednum: u16,
    /// Skill/multiplayer flags.
    #[serde(default)]
    pub flags: u16,
}

/// A decoded level.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MapData {
    /// Level name, e.g. `E1M1`.
    pub name: String,
    /// Vertices.
    pub vertices: Vec<Vertex>,
    /// Linedefs.
    pub linedefs: Vec<Linedef>,
    /// Sidedefs.
    pub sidedefs: Vec<Sidedef>,
    /// Sectors.
    pub sectors: Vec<Sector>,
    /// BSP segs.
    #[serde(default)]
    pub segs: Vec<Seg>,
    /// BSP leaves.
    #[serde(default)]
    pub subsectors: Vec<Subsector>,
    /// BSP nodes; the root is the last entry.
    #[serde(default)]
    pub nodes: Vec<Node>,
    /// Spawn list.
    #[serde(default)]
    pub things: Vec<ThingSpawn>,
    /// Precomputed blockmap, built on load when absent.
    #[serde(default)]
    pub blockmap: Option<Blockmap>,
    /// Sector visibility table.
    #[serde(default)]
    pub reject: Option<Reject>,
}

impl MapData {
    /// Parse the JSON interchange form.
    pub fn from_json(text: &str) -> MapResult<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Serialize to the JSON interchange form.
    pub fn to_json(&self) -> MapResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Bounding box of all vertices.
    pub fn bounds(&self) -> Option<Aabb> {
        Aabb::from_points(self.vertices.iter().map(Vertex::pos))
    }

    /// Vertex position by index.
    pub fn vertex(&self, index: usize) -> Option<Vec2> {
        self.vertices.get(index).map(Vertex::pos)
    }

    /// Start and end position of a linedef.
    pub fn line_endpoints(&self, line: usize) -> Option<(Vec2, Vec2)> {
        let l = self.linedefs.get(line)?;
        Some((self.vertex(l.start)?, self.vertex(l.end)?))
    }

    /// Sector bordered by a sidedef, checked against the sector array.
    pub fn sidedef_sector(&self, sidedef: usize) -> Option<usize> {
        let sector = self.sidedefs.get(sidedef)?.sector;
        (sector < self.sectors.len()).then_some(sector)
    }

    /// Front and back sector of a linedef.
    pub fn line_sectors(&self, line: usize) -> (Option<usize>, Option<usize>) {
        match self.linedefs.get(line) {
            Some(l) => (
                self.sidedef_sector(l.right_sidedef),
                l.left_sidedef.and_then(|sd| self.sidedef_sector(sd)),
            ),
            None => (None, None),
        }
    }

    /// Sector on the face a seg runs along.
    pub fn seg_sector(&self, seg: usize) -> Option<usize> {
        let seg = self.segs.get(seg)?;
        let line = self.linedefs.get(seg.linedef)?;
        let sidedef = if seg.direction == 0 {
            Some(line.right_sidedef)
        } else {
            line.left_sidedef
        }?;
        self.sidedef_sector(sidedef)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_room_data() -> MapData {
        MapData {
            name: "TEST".into(),
            vertices: vec![Vertex::new(0.0, 0.0), Vertex::new(0.0, 64.0)],
            linedefs: vec![Linedef {
                start: 0,
                end: 1,
                flags: LinedefFlags::TWO_SIDED,
                special: 0,
                tag: 0,
                right_sidedef: 0,
                left_sidedef: Some(1),
            }],
            sidedefs: vec![Sidedef::facing(1), Sidedef::facing(0)],
            sectors: vec![Sector::with_heights(0.0, 128.0), Sector::with_heights(8.0, 96.0)],
            segs: vec![Seg {
                start: 1,
                end: 0,
                angle: 0,
                linedef: 0,
                direction: 1,
                offset: 0.0,
            }],
            ..MapData::default()
        }
    }

    #[test]
    fn node_child_decodes_leaf_bit() {
        assert_eq!(NodeChild::from(42), NodeChild::Node(42));
        assert_eq!(NodeChild::from(0x8005), NodeChild::Subsector(5));
        assert_eq!(NodeChild::from(NF_SUBSECTOR), NodeChild::Subsector(0));
        assert_eq!(u16::from(NodeChild::Subsector(5)), 0x8005);
    }

    #[test]
    fn oversized_child_index_saturates_instead_of_wrapping() {
        assert_eq!(u16::from(NodeChild::Node(0x8000)), 0x7FFF);
        assert_eq!(u16::from(NodeChild::Node(70_000)), 0x7FFF);
        assert_eq!(u16::from(NodeChild::Subsector(0x8001)), 0xFFFF);
        // Saturated values still decode as the kind they were.
        assert_eq!(NodeChild::from(u16::from(NodeChild::Node(0x9000))), NodeChild::Node(0x7FFF));
    }

    #[test]
    fn node_child_deserializes_from_raw() {
        let child: NodeChild = serde_json::from_str("32771").unwrap();
        assert_eq!(child, NodeChild::Subsector(3));
    }

    #[test]
    fn flags_round_trip_as_bits() {
        let flags = LinedefFlags::BLOCKING | LinedefFlags::TWO_SIDED;
        assert_eq!(serde_json::to_string(&flags).unwrap(), "5");
        let back: LinedefFlags = serde_json::from_str("5").unwrap();
        assert_eq!(back, flags);
    }

    #[test]
    fn line_sectors_resolve_both_faces() {
        let map = two_room_data();
        assert_eq!(map.line_sectors(0), (Some(1), Some(0)));
        assert_eq!(map.line_sectors(9), (None, None));
    }

    #[test]
    fn seg_sector_follows_direction() {
        let map = two_room_data();
        assert_eq!(map.seg_sector(0), Some(0));
    }

    #[test]
    fn out_of_range_sidedef_sector_is_none() {
        let mut map = two_room_data();
        map.sidedefs[0].sector = 99;
        assert_eq!(map.sidedef_sector(0), None);
        assert_eq!(map.sidedef_sector(7), None);
    }

    #[test]
    fn json_round_trip_keeps_geometry() {
        let map = two_room_data();
        let text = map.to_json().unwrap();
        let back = MapData::from_json(&text).unwrap();
        assert_eq!(back.linedefs, map.linedefs);
        assert_eq!(back.sectors, map.sectors);
    }

    #[test]
    fn invalid_json_is_parse_error() {
        assert!(MapData::from_json("{ not json").is_err());
    }

    #[test]
    fn bounds_cover_vertices() {
        let map = two_room_data();
        let bb = map.bounds().unwrap();
        assert_eq!(bb.max, Vec2::new(0.0, 64.0));
    }
}
