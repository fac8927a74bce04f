//! XObject creation for poster tiling
//!
//! This module handles creating Form XObjects from source PDF pages,
//! which are then painted onto every tile of that page with a pure
//! translation.

use crate::constants::DEFAULT_PAGE_DIMENSIONS;
use crate::types::{PosterError, Result};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use std::collections::HashMap;

/// Deepest page tree walked when looking up inherited attributes
const MAX_TREE_DEPTH: usize = 64;

// =============================================================================
// XObject Creation
// =============================================================================

/// Create the Form XObjects that paint a source page.
///
/// Usually this is a single form. A content array with a member whose filter
/// lopdf cannot decode is split, and that member keeps its filter in a form of
/// its own. Painting the forms in order reproduces the page.
///
/// Every form shares the page's BBox (its MediaBox), its resources and a
/// Matrix that moves the MediaBox's lower-left corner to the origin, so
/// placing a form at `(0, 0)` puts the visible page exactly on
/// `[0, width] × [0, height]`.
///
/// # Arguments
/// * `output` - The output document to add the XObjects to
/// * `source` - The source document containing the page
/// * `page_id` - The object ID of the source page
/// * `cache` - Cache to avoid copying the same object multiple times
pub fn create_page_xobjects(
    output: &mut Document,
    source: &Document,
    page_id: ObjectId,
    cache: &mut HashMap<ObjectId, ObjectId>,
) -> Result<Vec<ObjectId>> {
    let page_dict = source.get_dictionary(page_id)?;
    let media_box = get_media_box(source, page_id)?;

    // Get page content
    let segments = get_page_content(source, page_dict)?;

    // Copy resources if present, including ones inherited from the page tree.
    // Split pages store them once and reference them from every form.
    let resources = match inherited_attribute(source, page_id, b"Resources")? {
        Some(resources) => {
            let copied = copy_object_deep(output, source, resources, cache)?;
            if segments.len() > 1 && !matches!(copied, Object::Reference(_)) {
                Some(Object::Reference(output.add_object(copied)))
            } else {
                Some(copied)
            }
        }
        None => None,
    };

    let mut forms = Vec::with_capacity(segments.len());
    for segment in segments {
        let mut xobject_dict = form_dictionary(&media_box);
        if let Some(resources) = &resources {
            xobject_dict.set("Resources", resources.clone());
        }

        let stream = match segment {
            ContentSegment::Decoded(content) => Stream::new(xobject_dict, content),
            ContentSegment::Filtered {
                content,
                filter,
                decode_parms,
            } => {
                let filter = copy_object_deep(output, source, &filter, cache)?;
                xobject_dict.set("Filter", filter);
                if let Some(parms) = decode_parms {
                    let parms = copy_object_deep(output, source, &parms, cache)?;
                    xobject_dict.set("DecodeParms", parms);
                }
                Stream::new(xobject_dict, content).with_compression(false)
            }
        };
        forms.push(output.add_object(stream));
    }

    Ok(forms)
}

fn form_dictionary(media_box: &MediaBox) -> Dictionary {
    let mut xobject_dict = Dictionary::new();
    xobject_dict.set("Type", Object::Name(b"XObject".to_vec()));
    xobject_dict.set("Subtype", Object::Name(b"Form".to_vec()));
    xobject_dict.set("FormType", Object::Integer(1));
    xobject_dict.set(
        "BBox",
        Object::Array(vec![
            Object::Real(media_box.llx),
            Object::Real(media_box.lly),
            Object::Real(media_box.urx),
            Object::Real(media_box.ury),
        ]),
    );
    xobject_dict.set(
        "Matrix",
        Object::Array(vec![
            Object::Integer(1),
            Object::Integer(0),
            Object::Integer(0),
            Object::Integer(1),
            Object::Real(-media_box.llx),
            Object::Real(-media_box.lly),
        ]),
    );
    xobject_dict
}

// =============================================================================
// Page Content Extraction
// =============================================================================

/// A run of page content that becomes one form
#[derive(Debug)]
enum ContentSegment {
    /// Unfiltered operators
    Decoded(Vec<u8>),
    /// Encoded bytes, left for the reader to decode
    Filtered {
        content: Vec<u8>,
        filter: Object,
        decode_parms: Option<Object>,
    },
}

impl ContentSegment {
    /// The stream as-is, keeping any filter
    fn from_stream(stream: &Stream) -> Self {
        match stream.dict.get(b"Filter") {
            Ok(filter) => ContentSegment::Filtered {
                content: stream.content.clone(),
                filter: filter.clone(),
                decode_parms: stream.dict.get(b"DecodeParms").ok().cloned(),
            },
            Err(_) => ContentSegment::Decoded(stream.content.clone()),
        }
    }
}

/// Get the content of a page as one or more segments.
fn get_page_content(doc: &Document, page_dict: &Dictionary) -> Result<Vec<ContentSegment>> {
    let contents = match page_dict.get(b"Contents") {
        Ok(c) => c,
        Err(_) => return Ok(vec![ContentSegment::Decoded(Vec::new())]), // No content = blank page
    };

    match contents {
        Object::Reference(id) => match doc.get_object(*id)? {
            // Contents may point at an array of stream references
            Object::Array(arr) => get_concatenated_content_streams(doc, arr),
            other => Ok(vec![ContentSegment::from_stream(other.as_stream()?)]),
        },
        Object::Array(arr) => get_concatenated_content_streams(doc, arr),
        Object::Stream(stream) => Ok(vec![ContentSegment::from_stream(stream)]),
        other => Err(PosterError::MalformedContent(format!(
            "Contents must be a stream or an array of streams, found {:?}",
            other
        ))),
    }
}

/// Concatenate multiple content streams.
///
/// Members lopdf has no decoder for are kept encoded as segments of their own.
fn get_concatenated_content_streams(
    doc: &Document,
    refs: &[Object],
) -> Result<Vec<ContentSegment>> {
    let mut segments = Vec::new();
    let mut pending = Vec::new();

    for obj in refs {
        let stream = match obj {
            Object::Reference(id) => doc.get_object(*id)?.as_stream()?,
            other => other.as_stream()?,
        };

        let decoded = if stream.dict.has(b"Filter") {
            match stream.decompressed_content() {
                Ok(content) => content,
                Err(lopdf::Error::Unimplemented(feature)) => {
                    log::debug!("Keeping content stream encoded ({})", feature);
                    if !pending.is_empty() {
                        segments.push(ContentSegment::Decoded(std::mem::take(&mut pending)));
                    }
                    segments.push(ContentSegment::from_stream(stream));
                    continue;
                }
                Err(e) => return Err(e.into()),
            }
        } else {
            stream.content.clone()
        };

        pending.extend_from_slice(&decoded);
        pending.push(b'\n');
    }

    if !pending.is_empty() || segments.is_empty() {
        segments.push(ContentSegment::Decoded(pending));
    }

    Ok(segments)
}

// =============================================================================
// Deep Copy
// =============================================================================

/// Deep copy an object from source to output document, following references.
///
/// Uses a cache to avoid copying the same object multiple times. `Parent`
/// links are dropped since they would drag in the source page tree.
pub fn copy_object_deep(
    output: &mut Document,
    source: &Document,
    obj: &Object,
    cache: &mut HashMap<ObjectId, ObjectId>,
) -> Result<Object> {
    match obj {
        Object::Reference(id) => {
            // Check cache first
            if let Some(&new_id) = cache.get(id) {
                return Ok(Object::Reference(new_id));
            }

            // Reserve the id before recursing so reference cycles terminate
            let new_id = output.new_object_id();
            cache.insert(*id, new_id);

            let referenced = source.get_object(*id)?;
            let copied = copy_object_deep(output, source, referenced, cache)?;
            output.objects.insert(new_id, copied);

            Ok(Object::Reference(new_id))
        }
        Object::Dictionary(dict) => Ok(Object::Dictionary(copy_dictionary(
            output, source, dict, cache,
        )?)),
        Object::Array(arr) => {
            let new_arr: Result<Vec<_>> = arr
                .iter()
                .map(|item| copy_object_deep(output, source, item, cache))
                .collect();
            Ok(Object::Array(new_arr?))
        }
        Object::Stream(stream) => Ok(Object::Stream(Stream {
            dict: copy_dictionary(output, source, &stream.dict, cache)?,
            content: stream.content.clone(),
            allows_compression: stream.allows_compression,
            start_position: None,
        })),
        // Primitive types: just clone
        _ => Ok(obj.clone()),
    }
}

fn copy_dictionary(
    output: &mut Document,
    source: &Document,
    dict: &Dictionary,
    cache: &mut HashMap<ObjectId, ObjectId>,
) -> Result<Dictionary> {
    let mut new_dict = Dictionary::new();
    for (key, value) in dict.iter() {
        if key.as_slice() == b"Parent" {
            continue;
        }
        new_dict.set(key.clone(), copy_object_deep(output, source, value, cache)?);
    }
    Ok(new_dict)
}

// =============================================================================
// Page Geometry
// =============================================================================

/// A page's MediaBox, normalized so `llx <= urx` and `lly <= ury`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MediaBox {
    pub llx: f32,
    pub lly: f32,
    pub urx: f32,
    pub ury: f32,
}

impl MediaBox {
    pub fn width(&self) -> f32 {
        self.urx - self.llx
    }

    pub fn height(&self) -> f32 {
        self.ury - self.lly
    }
}

/// Get the MediaBox of a page, looking up the page tree when inherited.
///
/// Pages without a usable MediaBox fall back to US Letter.
pub fn get_media_box(doc: &Document, page_id: ObjectId) -> Result<MediaBox> {
    let parsed = inherited_attribute(doc, page_id, b"MediaBox")?
        .and_then(|obj| resolve(doc, obj).ok())
        .and_then(|obj| obj.as_array().ok())
        .and_then(|arr| parse_rectangle(doc, arr));

    match parsed {
        Some(media_box) if media_box.width() > 0.0 && media_box.height() > 0.0 => Ok(media_box),
        _ => {
            log::warn!(
                "Page {:?} has no usable MediaBox, assuming {} x {} pt",
                page_id,
                DEFAULT_PAGE_DIMENSIONS.0,
                DEFAULT_PAGE_DIMENSIONS.1
            );
            Ok(MediaBox {
                llx: 0.0,
                lly: 0.0,
                urx: DEFAULT_PAGE_DIMENSIONS.0,
                ury: DEFAULT_PAGE_DIMENSIONS.1,
            })
        }
    }
}

/// Get source page dimensions (width, height) in points
pub fn get_page_dimensions(doc: &Document, page_id: ObjectId) -> Result<(f32, f32)> {
    let media_box = get_media_box(doc, page_id)?;
    Ok((media_box.width(), media_box.height()))
}

fn parse_rectangle(doc: &Document, arr: &[Object]) -> Option<MediaBox> {
    if arr.len() != 4 {
        return None;
    }
    let mut values = [0.0f32; 4];
    for (value, obj) in values.iter_mut().zip(arr) {
        *value = extract_number(resolve(doc, obj).ok()?)?;
    }
    let [x1, y1, x2, y2] = values;
    Some(MediaBox {
        llx: x1.min(x2),
        lly: y1.min(y2),
        urx: x1.max(x2),
        ury: y1.max(y2),
    })
}

/// Extract numeric value from a PDF object
fn extract_number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

// =============================================================================
// Page Tree Helpers
// =============================================================================

/// Look up a page attribute, walking up `Parent` links for inheritable keys
fn inherited_attribute<'a>(
    doc: &'a Document,
    page_id: ObjectId,
    key: &[u8],
) -> Result<Option<&'a Object>> {
    let mut node = doc.get_dictionary(page_id)?;

    for _ in 0..MAX_TREE_DEPTH {
        if let Ok(value) = node.get(key) {
            return Ok(Some(value));
        }
        match node.get(b"Parent").and_then(|parent| parent.as_reference()) {
            Ok(parent_id) => node = doc.get_dictionary(parent_id)?,
            Err(_) => return Ok(None),
        }
    }

    Ok(None)
}

/// Follow a single level of indirection
fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> Result<&'a Object> {
    match obj {
        Object::Reference(id) => Ok(doc.get_object(*id)?),
        _ => Ok(obj),
    }
}
