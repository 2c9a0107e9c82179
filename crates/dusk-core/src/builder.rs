//! Programmatic map construction.
//!
//! [`RowMapBuilder`] lays rectangular rooms side by side along +X and emits
//! a complete [`MapData`] with sidedefs, segs and a valid BSP. Used for the
//! built-in demo level and throughout the test suites.

use std::f32::consts::TAU;

use glam::Vec2;

use crate::error::MapResult;
use crate::index::MapIndex;
use crate::map::{
    Linedef, LinedefFlags, MapData, Node, NodeChild, Sector, Seg, Sidedef, Subsector, ThingSpawn,
    Vertex,
};

const WALL_TEXTURE: &str = "STARTAN2";
const DOOR_TEXTURE: &str = "BIGDOOR2";
const FLOOR_FLAT: &str = "FLOOR4_8";
const CEILING_FLAT: &str = "CEIL3_5";
const SKY_FLAT: &str = "F_SKY1";

/// One rectangular room in a row.
#[derive(Debug, Clone)]
pub struct Room {
    width: f32,
    floor: f32,
    ceiling: f32,
    tag: u16,
    light: u16,
    sky: bool,
    entry_special: u16,
    entry_tag: u16,
    entry_flags: LinedefFlags,
    switch_special: u16,
    switch_tag: u16,
}

impl Room {
    /// A room `width` units wide with the given plane heights.
    pub fn new(width: f32, floor: f32, ceiling: f32) -> Self {
        Self {
            width,
            floor,
            ceiling,
            tag: 0,
            light: 160,
            sky: false,
            entry_special: 0,
            entry_tag: 0,
            entry_flags: LinedefFlags::empty(),
            switch_special: 0,
            switch_tag: 0,
        }
    }

    /// Sector tag.
    pub fn tag(mut self, tag: u16) -> Self {
        self.tag = tag;
        self
    }

    /// Light level.
    pub fn light(mut self, light: u16) -> Self {
        self.light = light;
        self
    }

    /// Open sky ceiling.
    pub fn sky(mut self) -> Self {
        self.sky = true;
        self
    }

    /// Special on the shared line with the previous room.
    pub fn entry(mut self, special: u16, tag: u16) -> Self {
        self.entry_special = special;
        self.entry_tag = tag;
        self
    }

    /// Extra flags on the shared line with the previous room.
    pub fn entry_flags(mut self, flags: LinedefFlags) -> Self {
        self.entry_flags = flags;
        self
    }

    /// Special on this room's north wall, typically a switch.
    pub fn switch(mut self, special: u16, tag: u16) -> Self {
        self.switch_special = special;
        self.switch_tag = tag;
        self
    }
}

/// Builds a row of rooms spanning `y` in `[0, depth]`, starting at `origin_x`.
///
/// Room `i` becomes sector `i` and subsector `i`. The line between rooms
/// `i - 1` and `i` runs north with room `i` on its front side.
#[derive(Debug, Clone)]
pub struct RowMapBuilder {
    origin_x: f32,
    depth: f32,
    rooms: Vec<Room>,
    things: Vec<ThingSpawn>,
}

impl RowMapBuilder {
    /// Start an empty row.
    pub fn new(origin_x: f32, depth: f32) -> Self {
        Self {
            origin_x,
            depth,
            rooms: Vec::new(),
            things: Vec::new(),
        }
    }

    /// Append a room on the east end.
    pub fn room(mut self, room: Room) -> Self {
        self.rooms.push(room);
        self
    }

    /// Place a thing.
    pub fn thing(mut self, x: f32, y: f32, angle: f32, doomednum: u16) -> Self {
        self.things.push(ThingSpawn {
            x,
            y,
            angle,
            doomednum,
            flags: 0x07,
        });
        self
    }

    /// Emit the map without indexing it.
    pub fn build_data(&self, name: &str) -> MapData {
        let mut map = MapData {
            name: name.to_string(),
            things: self.things.clone(),
            ..MapData::default()
        };
        if self.rooms.is_empty() {
            return map;
        }

        let mut x = self.origin_x;
        let mut edges = vec![x];
        for room in &self.rooms {
            x += room.width;
            edges.push(x);
        }
        for &ex in &edges {
            map.vertices.push(Vertex::new(ex, 0.0));
            map.vertices.push(Vertex::new(ex, self.depth));
        }
        let bottom = |k: usize| 2 * k;
        let top = |k: usize| 2 * k + 1;

        for room in &self.rooms {
            map.sectors.push(Sector {
                floor_height: room.floor,
                ceiling_height: room.ceiling,
                floor_texture: FLOOR_FLAT.into(),
                ceiling_texture: if room.sky { SKY_FLAT } else { CEILING_FLAT }.into(),
                light_level: room.light,
                special: 0,
                tag: room.tag,
            });
        }

        let last = self.rooms.len() - 1;
        // Per room: south, north, west (outer or shared); east outer at the end.
        let mut walls: Vec<[usize; 4]> = Vec::with_capacity(self.rooms.len());
        for (i, room) in self.rooms.iter().enumerate() {
            let south = push_solid(&mut map, bottom(i + 1), bottom(i), i, 0, 0);
            let north = push_solid(
                &mut map,
                top(i),
                top(i + 1),
                i,
                room.switch_special,
                room.switch_tag,
            );
            let west = if i == 0 {
                push_solid(&mut map, bottom(0), top(0), 0, 0, 0)
            } else {
                push_shared(&mut map, bottom(i), top(i), i, i - 1, room)
            };
            walls.push([south, north, west, usize::MAX]);
        }
        let east = push_solid(&mut map, top(last + 1), bottom(last + 1), last, 0, 0);
        let east_walls: Vec<usize> = walls.iter().skip(1).map(|w| w[2]).chain([east]).collect();
        for (room_walls, east) in walls.iter_mut().zip(east_walls) {
            room_walls[3] = east;
        }

        for (i, [south, north, west, east]) in walls.into_iter().enumerate() {
            let first_seg = map.segs.len();
            for line in [south, north, west] {
                push_seg(&mut map, line, 0);
            }
            push_seg(&mut map, east, if i == last { 0 } else { 1 });
            map.subsectors.push(Subsector {
                seg_count: 4,
                first_seg,
            });
        }

        // Partition chain: node for edge k splits room k-1 (left) from the rest.
        for k in (1..self.rooms.len()).rev() {
            let right = if k == last {
                NodeChild::Subsector(last)
            } else {
                NodeChild::Node(map.nodes.len() - 1)
            };
            let x = edges[k];
            map.nodes.push(Node {
                x,
                y: 0.0,
                dx: 0.0,
                dy: self.depth,
                bbox_right: [self.depth, 0.0, x, edges[last + 1]],
                bbox_left: [self.depth, 0.0, edges[k - 1], x],
                right,
                left: NodeChild::Subsector(k - 1),
            });
        }
        map
    }

    /// Emit and index the map.
    pub fn build(&self, name: &str) -> MapResult<MapIndex> {
        MapIndex::new(self.build_data(name))
    }

    /// The level shipped with the command line tool.
    ///
    /// Start room, a door, a hall with a zombieman and a switch, a
    /// blue-locked door and a raised exit room the switch lowers.
    pub fn demo() -> Self {
        Self::new(0.0, 256.0)
            .room(Room::new(256.0, 0.0, 128.0).light(192))
            .room(Room::new(16.0, 0.0, 0.0).entry(1, 0))
            .room(Room::new(384.0, 0.0, 160.0).light(144).sky().switch(23, 7))
            .room(Room::new(16.0, 0.0, 0.0).entry(26, 0))
            .room(Room::new(256.0, 64.0, 192.0).tag(7))
            .thing(64.0, 128.0, 0.0, 1)
            .thing(192.0, 64.0, 0.0, 2011)
            .thing(192.0, 192.0, 0.0, 2001)
            .thing(560.0, 128.0, 180.0, 3004)
            .thing(600.0, 220.0, 0.0, 5)
            .thing(520.0, 40.0, 0.0, 2008)
            .thing(800.0, 128.0, 180.0, 3001)
    }
}

fn push_sidedef(map: &mut MapData, sector: usize, middle: &str, upper_lower: &str) -> usize {
    map.sidedefs.push(Sidedef {
        middle_texture: middle.into(),
        upper_texture: upper_lower.into(),
        lower_texture: upper_lower.into(),
        ..Sidedef::facing(sector)
    });
    map.sidedefs.len() - 1
}

fn push_solid(
    map: &mut MapData,
    start: usize,
    end: usize,
    sector: usize,
    special: u16,
    tag: u16,
) -> usize {
    let right_sidedef = push_sidedef(map, sector, WALL_TEXTURE, "");
    map.linedefs.push(Linedef {
        start,
        end,
        flags: LinedefFlags::BLOCKING,
        special,
        tag,
        right_sidedef,
        left_sidedef: None,
    });
    map.linedefs.len() - 1
}

fn push_shared(
    map: &mut MapData,
    start: usize,
    end: usize,
    front: usize,
    back: usize,
    room: &Room,
) -> usize {
    let trim = if room.entry_special != 0 {
        DOOR_TEXTURE
    } else {
        WALL_TEXTURE
    };
    let right_sidedef = push_sidedef(map, front, "", trim);
    let left_sidedef = push_sidedef(map, back, "", trim);
    map.linedefs.push(Linedef {
        start,
        end,
        flags: LinedefFlags::TWO_SIDED | room.entry_flags,
        special: room.entry_special,
        tag: room.entry_tag,
        right_sidedef,
        left_sidedef: Some(left_sidedef),
    });
    map.linedefs.len() - 1
}

fn push_seg(map: &mut MapData, line: usize, direction: u16) {
    let l = &map.linedefs[line];
    let (start, end) = if direction == 0 {
        (l.start, l.end)
    } else {
        (l.end, l.start)
    };
    let d = map.vertices[end].pos() - map.vertices[start].pos();
    map.segs.push(Seg {
        start,
        end,
        angle: binary_angle(d),
        linedef: line,
        direction,
        offset: 0.0,
    });
}

fn binary_angle(d: Vec2) -> u16 {
    let turns = d.y.atan2(d.x).rem_euclid(TAU) / TAU;
    (turns * 65536.0) as u32 as u16
}
