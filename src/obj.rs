use std::fs;
use std::path::Path;
use std::collections::BTreeMap;

use crate::tuple::Tuple4D;
use crate::shape::{ Shape, ShapeId, ShapeKind, TriangleInfo };
use crate::arena::ShapeArena;
use crate::error::{ RayTracerError, Result };

/// Name of the group that faces land in before any `g` record.
const DEFAULT_GROUP: &str = "";

/// A parsed Wavefront OBJ mesh.
///
/// Only the geometric subset is understood:
///
/// ```obj
/// v -1 1 0
/// v -1 0 0
/// v 1 0 0
/// v 1 1 0
///
/// g FirstGroup
/// f 1 2 3
/// g SecondGroup
/// f 1 3 4
/// ```
///
/// `v` declares a vertex and `f` a face over 1-based vertex indices. `g`
/// switches the named group that later faces are added to; groups do not
/// nest. `vn` normals are recorded but faces are always flat.
#[derive(Clone, Debug, Default)]
pub struct ObjParser {
    pub ignored_lines: usize,

    pub vertices: Vec<Tuple4D>,
    pub normals: Vec<Tuple4D>,
    groups: BTreeMap<String, Vec<TriangleInfo>>,
}

impl ObjParser {
    /// Parses OBJ text. Unsupported or malformed lines are skipped and
    /// counted in `ignored_lines`; a face referring to a missing vertex is an
    /// error.
    pub fn parse_str(source: &str) -> Result<ObjParser> {
        let mut parser = ObjParser::default();
        let mut current_group = DEFAULT_GROUP.to_string();

        for (n, line) in source.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            parser.handle_command(n + 1, line, &mut current_group)?;
        }

        log::debug!(
            "parsed OBJ: {} vertices, {} normals, {} triangles in {} groups, {} lines ignored",
            parser.vertices.len(),
            parser.normals.len(),
            parser.groups.values().map(Vec::len).sum::<usize>(),
            parser.groups.len(),
            parser.ignored_lines
        );

        Ok(parser)
    }

    pub fn parse_file(path: &Path) -> Result<ObjParser> {
        ObjParser::parse_str(&fs::read_to_string(path)?)
    }

    fn handle_command(&mut self, n: usize, line: &str, current_group: &mut String)
        -> Result<()> {
        let mut params = line.split_whitespace();

        match params.next() {
            Some("v") => match parse_xyz(params) {
                Some((x, y, z)) => self.vertices.push(Tuple4D::point(x, y, z)),
                None => self.ignore_malformed(n, line),
            },
            Some("vn") => match parse_xyz(params) {
                Some((x, y, z)) => self.normals.push(Tuple4D::vector(x, y, z)),
                None => self.ignore_malformed(n, line),
            },
            Some("g") => match params.next() {
                Some(name) => *current_group = name.to_string(),
                None => self.ignore_malformed(n, line),
            },
            Some("f") => {
                // Only the vertex part of `v/vt/vn` is used.
                let face: Option<Vec<usize>> = params
                    .map(|p| p.split('/').next().and_then(|v| v.parse().ok()))
                    .collect();

                match face {
                    Some(face) if face.len() >= 3 => {
                        let triangles = self.fan_triangulation(n, &face)?;
                        self.groups.entry(current_group.clone())
                            .or_default()
                            .extend(triangles);
                    },
                    _ => self.ignore_malformed(n, line),
                }
            },
            _ => self.ignored_lines += 1,
        }

        Ok(())
    }

    fn ignore_malformed(&mut self, n: usize, line: &str) {
        log::warn!("ignoring malformed OBJ line {}: {:?}", n, line);
        self.ignored_lines += 1;
    }

    fn vertex(&self, n: usize, index: usize) -> Result<Tuple4D> {
        index.checked_sub(1)
            .and_then(|i| self.vertices.get(i))
            .copied()
            .ok_or_else(|| RayTracerError::ObjParse {
                line: n,
                reason: format!(
                    "vertex index {} outside 1..={}", index, self.vertices.len()
                ),
            })
    }

    /// Splits a convex polygon into triangles sharing its first vertex.
    ///
    /// ```text
    ///         B *
    ///          / \
    ///         /   \
    ///     A *       * C
    ///       |       |
    ///     E * ----- * D
    /// ```
    ///
    /// `A-B-C-D-E` becomes `A-B-C`, `A-C-D` and `A-D-E`.
    fn fan_triangulation(&self, n: usize, face: &[usize])
        -> Result<Vec<TriangleInfo>> {
        let first = self.vertex(n, face[0])?;

        face.windows(2).skip(1)
            .map(|pair| -> Result<TriangleInfo> {
                Ok(TriangleInfo::new(
                    first,
                    self.vertex(n, pair[0])?,
                    self.vertex(n, pair[1])?,
                ))
            })
            .collect()
    }

    /// Triangles of the named group, or of the default group for `""`.
    pub fn triangles(&self, group: &str) -> &[TriangleInfo] {
        self.groups.get(group).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Names of the groups holding at least one triangle.
    pub fn group_names(&self) -> impl Iterator<Item = &str> {
        self.groups.iter()
            .filter(|(name, triangles)| !name.is_empty() && !triangles.is_empty())
            .map(|(name, _)| name.as_str())
    }

    /// Adds the mesh to `shapes` as one detached group. Every named group
    /// becomes a sub-group; default-group triangles are direct children.
    pub fn into_group(&self, shapes: &mut ShapeArena) -> Result<ShapeId> {
        let root = shapes.insert(Shape::group());

        for triangle in self.triangles(DEFAULT_GROUP) {
            shapes.add_child(root, Shape::new(ShapeKind::Triangle(*triangle)))?;
        }

        for name in self.group_names() {
            let group = shapes.add_child(root, Shape::group())?;
            for triangle in self.triangles(name) {
                shapes.add_child(group, Shape::new(ShapeKind::Triangle(*triangle)))?;
            }
        }

        Ok(root)
    }

    /// Like `into_group`, with every triangle indexed by one k-d tree.
    pub fn into_partition(&self, shapes: &mut ShapeArena, max_depth: usize)
        -> Result<ShapeId> {
        let mut triangles = Vec::new();
        for triangle in self.groups.values().flatten() {
            triangles.push(shapes.insert(Shape::new(ShapeKind::Triangle(*triangle))));
        }

        shapes.partition_shapes(&triangles, max_depth)
    }
}

fn parse_xyz<'a>(mut params: impl Iterator<Item = &'a str>)
    -> Option<(f64, f64, f64)> {
    let mut next = || params.next().and_then(|p| p.parse().ok());
    Some((next()?, next()?, next()?))
}

#[test]
fn ignoring_unrecognized_lines() {
    let gibberish = "There was a young lady named Bright\n\
        who traveled much faster than light.\n\
        She set out one day\n\
        in a relative way,\n\
        and came back the previous night.\n";
    let parser = ObjParser::parse_str(gibberish).unwrap();

    assert_eq!(parser.ignored_lines, 5);
    assert!(parser.vertices.is_empty());
}

#[test]
fn malformed_records_are_ignored() {
    let parser = ObjParser::parse_str(
        "v 1 2\nv 1 2 x\nvn 0 1\ng\nf 1 2\nv 0 0 0\n"
    ).unwrap();

    assert_eq!(parser.ignored_lines, 5);
    assert_eq!(parser.vertices, vec![Tuple4D::point(0.0, 0.0, 0.0)]);
}

#[test]
fn vertex_records() {
    let parser = ObjParser::parse_str(
        "v -1 1 0\nv -1.0000 0.5000 0.0000\nv 1 0 0\nv 1 1 0\n"
    ).unwrap();

    assert_eq!(parser.vertices, vec![
        Tuple4D::point(-1.0, 1.0, 0.0),
        Tuple4D::point(-1.0, 0.5, 0.0),
        Tuple4D::point( 1.0, 0.0, 0.0),
        Tuple4D::point( 1.0, 1.0, 0.0),
    ]);
}

#[test]
fn parsing_triangle_faces() {
    let parser = ObjParser::parse_str(
        "v -1 1 0\nv -1 0 0\nv 1 0 0\nv 1 1 0\n\nf 1 2 3\nf 1 3 4\n"
    ).unwrap();
    let v = &parser.vertices;
    let t = parser.triangles("");

    assert_eq!(t.len(), 2);
    assert_eq!((t[0].p1, t[0].p2, t[0].p3), (v[0], v[1], v[2]));
    assert_eq!((t[1].p1, t[1].p2, t[1].p3), (v[0], v[2], v[3]));
}

#[test]
fn triangulating_polygons() {
    let parser = ObjParser::parse_str(
        "v -1 1 0\nv -1 0 0\nv 1 0 0\nv 1 1 0\nv 0 2 0\n\nf 1 2 3 4 5\n"
    ).unwrap();
    let v = &parser.vertices;
    let t = parser.triangles("");

    assert_eq!(t.len(), 3);
    assert_eq!((t[0].p1, t[0].p2, t[0].p3), (v[0], v[1], v[2]));
    assert_eq!((t[1].p1, t[1].p2, t[1].p3), (v[0], v[2], v[3]));
    assert_eq!((t[2].p1, t[2].p2, t[2].p3), (v[0], v[3], v[4]));
}

#[test]
fn triangles_in_groups() {
    let parser = ObjParser::parse_str(
        "v -1 1 0\nv -1 0 0\nv 1 0 0\nv 1 1 0\n\
         g FirstGroup\nf 1 2 3\ng SecondGroup\nf 1 3 4\n"
    ).unwrap();
    let v = &parser.vertices;

    let t1 = parser.triangles("FirstGroup");
    let t2 = parser.triangles("SecondGroup");
    assert_eq!((t1[0].p1, t1[0].p2, t1[0].p3), (v[0], v[1], v[2]));
    assert_eq!((t2[0].p1, t2[0].p2, t2[0].p3), (v[0], v[2], v[3]));
    assert!(parser.triangles("").is_empty());
    assert_eq!(parser.group_names().collect::<Vec<_>>(),
        vec!["FirstGroup", "SecondGroup"]);
}

#[test]
fn vertex_normal_records_and_slashed_faces() {
    let parser = ObjParser::parse_str(
        "v 0 1 0\nv -1 0 0\nv 1 0 0\n\
         vn -1 0 0\nvn 1 0 0\nvn 0 1 0\n\
         f 1//3 2//1 3//2\nf 1/0/3 2/102/1 3/14/2\n"
    ).unwrap();

    assert_eq!(parser.normals[2], Tuple4D::vector(0.0, 1.0, 0.0));
    let t = parser.triangles("");
    assert_eq!(t.len(), 2);
    assert_eq!(t[0], t[1]);
    assert_eq!(t[0].p1, Tuple4D::point(0.0, 1.0, 0.0));
}

#[test]
fn face_with_missing_vertex_fails() {
    let res = ObjParser::parse_str("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 4\n");
    assert!(matches!(res, Err(RayTracerError::ObjParse { line: 4, .. })));

    let res = ObjParser::parse_str("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 0 1 2\n");
    assert!(matches!(res, Err(RayTracerError::ObjParse { line: 4, .. })));
}

#[test]
fn converting_obj_to_group() {
    let parser = ObjParser::parse_str(
        "v -1 1 0\nv -1 0 0\nv 1 0 0\nv 1 1 0\n\
         f 1 2 4\ng FirstGroup\nf 1 2 3\ng SecondGroup\nf 1 3 4\n"
    ).unwrap();

    let mut shapes = ShapeArena::new();
    let g = parser.into_group(&mut shapes).unwrap();
    let children = shapes.children(g).unwrap().to_vec();

    // One loose triangle, then the two named groups.
    assert_eq!(children.len(), 3);
    assert!(matches!(shapes[children[0]].kind(), ShapeKind::Triangle(_)));
    assert_eq!(shapes.children(children[1]).unwrap().len(), 1);
    assert_eq!(shapes.children(children[2]).unwrap().len(), 1);
    assert!(!shapes.is_owned(g));
}

#[test]
fn converting_obj_to_partition() {
    use crate::ray::Ray4D;

    let parser = ObjParser::parse_str(
        "v -1 1 0\nv -1 0 0\nv 1 0 0\nv 1 1 0\n\
         g FirstGroup\nf 1 2 3\ng SecondGroup\nf 1 3 4\n"
    ).unwrap();

    let mut shapes = ShapeArena::new();
    let p = parser.into_partition(&mut shapes, 4).unwrap();

    assert!(matches!(shapes[p].kind(), ShapeKind::Partition(_)));
    assert_eq!(shapes.children(p).unwrap().len(), 2);

    let r = Ray4D::new(Tuple4D::point(0.5, 0.75, -2.0), Tuple4D::vector(0.0, 0.0, 1.0));
    let hit = shapes.intersect(p, &r).hit().unwrap();
    assert!(crate::feq(hit.t, 2.0));
}
