/// STL file parser for binary and ASCII formats
use std::path::Path;

use nalgebra::{Point3, Vector3};
use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::{multispace0, multispace1, not_line_ending},
    combinator::map,
    multi::{count, many0},
    number::complete::{float, le_f32, le_u16, le_u32},
    sequence::{preceded, tuple},
    IResult,
};

use crate::geometry::{Color, Mesh, Triangle};

const HEADER_LEN: usize = 80;
const FACET_LEN: usize = 50;
/// Set in a binary facet's attribute word when bits 0..15 carry an RGB555 color
const COLOR_VALID: u16 = 0x8000;

#[derive(Debug, thiserror::Error)]
pub enum StlError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("file too small to be a valid STL ({0} bytes)")]
    TooSmall(usize),
    #[error("binary STL declares {triangles} triangles ({expected} bytes) but holds {actual} bytes")]
    Truncated {
        triangles: usize,
        expected: usize,
        actual: usize,
    },
    #[error("binary STL is not valid UTF-8 and cannot be read as ASCII")]
    NotText,
    #[error("failed to parse ASCII STL near line {line}: {kind}")]
    Ascii { line: usize, kind: String },
}

/// Which STL flavour to expect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StlFormat {
    /// Try ASCII when the data starts with `solid`, fall back to binary
    #[default]
    Auto,
    Ascii,
    Binary,
}

/// Parse a binary STL file
pub fn parse_binary_stl(data: &[u8]) -> Result<Mesh, StlError> {
    if data.len() < HEADER_LEN + 4 {
        return Err(StlError::TooSmall(data.len()));
    }

    // Skip 80-byte header
    let body = &data[HEADER_LEN..];
    let (body, triangle_count) = le_u32::<_, nom::error::Error<&[u8]>>(body)
        .map_err(|_| StlError::TooSmall(data.len()))?;
    let triangle_count = triangle_count as usize;

    let expected = HEADER_LEN + 4 + triangle_count * FACET_LEN;
    if data.len() < expected {
        return Err(StlError::Truncated {
            triangles: triangle_count,
            expected,
            actual: data.len(),
        });
    }

    let (_, triangles) = count(parse_binary_facet, triangle_count)(body).map_err(|_| {
        StlError::Truncated {
            triangles: triangle_count,
            expected,
            actual: data.len(),
        }
    })?;

    Ok(Mesh { triangles })
}

fn parse_binary_facet(input: &[u8]) -> IResult<&[u8], Triangle> {
    let (input, normal) = parse_le_vector3(input)?;
    let (input, a) = parse_le_vector3(input)?;
    let (input, b) = parse_le_vector3(input)?;
    let (input, c) = parse_le_vector3(input)?;
    let (input, attribute) = le_u16(input)?;

    let vertices = [a, b, c].map(Point3::from);
    Ok((
        input,
        Triangle::new(normal, vertices).with_color(decode_attribute_color(attribute)),
    ))
}

fn parse_le_vector3(input: &[u8]) -> IResult<&[u8], Vector3<f32>> {
    map(tuple((le_f32, le_f32, le_f32)), |(x, y, z)| Vector3::new(x, y, z))(input)
}

/// Decodes the RGB555 color packed into a facet's attribute word
fn decode_attribute_color(attribute: u16) -> Option<Color> {
    if attribute & COLOR_VALID == 0 {
        return None;
    }
    let channel = |shift: u16| {
        let five_bits = (attribute >> shift) & 0x1F;
        (five_bits as u32 * 255 / 31) as u8
    };
    Some(Color::new(channel(10), channel(5), channel(0)))
}

/// Parse an ASCII STL file
///
/// Besides the standard grammar, a `color r g b` line (components in
/// `[0, 1]` or `[0, 255]`) tags every facet that follows it.
pub fn parse_ascii_stl(input: &str) -> Result<Mesh, StlError> {
    match parse_ascii_stl_impl(input) {
        Ok((_, mesh)) => Ok(mesh),
        Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => {
            let consumed = input.len() - e.input.len();
            Err(StlError::Ascii {
                line: input[..consumed].lines().count().max(1),
                kind: format!("{:?}", e.code),
            })
        }
        Err(nom::Err::Incomplete(_)) => Err(StlError::Ascii {
            line: input.lines().count(),
            kind: "unexpected end of input".to_string(),
        }),
    }
}

enum Statement {
    Color(Color),
    Facet(Triangle),
}

fn parse_ascii_stl_impl(input: &str) -> IResult<&str, Mesh> {
    let (input, _) = preceded(multispace0, tag("solid"))(input)?;
    let (input, _) = not_line_ending(input)?; // Optional name
    let (input, statements) = many0(alt((
        map(parse_color, Statement::Color),
        map(parse_facet, Statement::Facet),
    )))(input)?;
    let (input, _) = preceded(multispace0, tag("endsolid"))(input)?;
    let (input, _) = not_line_ending(input)?;

    let mut mesh = Mesh::with_capacity(statements.len());
    let mut color = None;
    for statement in statements {
        match statement {
            Statement::Color(c) => color = Some(c),
            Statement::Facet(triangle) => mesh.add_triangle(triangle.with_color(color)),
        }
    }

    Ok((input, mesh))
}

fn parse_color(input: &str) -> IResult<&str, Color> {
    let (input, _) = preceded(multispace0, tag("color"))(input)?;
    let (input, rgb) = parse_vector3(input)?;

    // Accept both unit-range and byte-range components
    let scale = if rgb.max() <= 1.0 { 255.0 } else { 1.0 };
    let channel = |c: f32| (c * scale).round().clamp(0.0, 255.0) as u8;
    Ok((input, Color::new(channel(rgb.x), channel(rgb.y), channel(rgb.z))))
}

fn parse_facet(input: &str) -> IResult<&str, Triangle> {
    let (input, _) = preceded(multispace0, tag("facet"))(input)?;
    let (input, _) = preceded(multispace1, tag("normal"))(input)?;
    let (input, normal) = parse_vector3(input)?;
    let (input, _) = preceded(multispace0, tag("outer"))(input)?;
    let (input, _) = preceded(multispace1, tag("loop"))(input)?;
    let (input, v1) = parse_vertex(input)?;
    let (input, v2) = parse_vertex(input)?;
    let (input, v3) = parse_vertex(input)?;
    let (input, _) = preceded(multispace0, tag("endloop"))(input)?;
    let (input, _) = preceded(multispace0, tag("endfacet"))(input)?;

    Ok((input, Triangle::new(normal, [v1, v2, v3])))
}

fn parse_vertex(input: &str) -> IResult<&str, Point3<f32>> {
    let (input, _) = preceded(multispace0, tag("vertex"))(input)?;
    let (input, v) = parse_vector3(input)?;
    Ok((input, Point3::from(v)))
}

fn parse_vector3(input: &str) -> IResult<&str, Vector3<f32>> {
    let (input, _) = multispace0(input)?;
    let (input, x) = float(input)?;
    let (input, _) = multispace1(input)?;
    let (input, y) = float(input)?;
    let (input, _) = multispace1(input)?;
    let (input, z) = float(input)?;
    Ok((input, Vector3::new(x, y, z)))
}

/// Parse STL data in the given format
pub fn parse_stl_as(data: &[u8], format: StlFormat) -> Result<Mesh, StlError> {
    match format {
        StlFormat::Auto => parse_stl(data),
        StlFormat::Binary => parse_binary_stl(data),
        StlFormat::Ascii => {
            let text = std::str::from_utf8(data).map_err(|_| StlError::NotText)?;
            parse_ascii_stl(text)
        }
    }
}

/// Detect and parse STL file (binary or ASCII)
pub fn parse_stl(data: &[u8]) -> Result<Mesh, StlError> {
    // Binary headers may also start with "solid", so ASCII is only a first guess
    if data.trim_ascii_start().starts_with(b"solid") {
        if let Ok(text) = std::str::from_utf8(data) {
            match parse_ascii_stl(text) {
                Ok(mesh) => return Ok(mesh),
                Err(e) => tracing::debug!("not an ASCII STL, trying binary: {e}"),
            }
        }
    }

    parse_binary_stl(data)
}

/// Read and parse an STL file from disk
pub fn load_stl(path: impl AsRef<Path>, format: StlFormat) -> Result<Mesh, StlError> {
    let path = path.as_ref();
    let data = std::fs::read(path)?;
    let mesh = parse_stl_as(&data, format)?;
    tracing::debug!(
        path = %path.display(),
        triangles = mesh.triangles.len(),
        "loaded STL"
    );
    Ok(mesh)
}
