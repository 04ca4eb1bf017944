//! Editable PDF model built on lopdf
//!
//! Covers the subset of document operations the compositor needs: page
//! lookup with inherited MediaBox, PNG embedding as an image XObject, and
//! drawing that image onto a page's content stream.

use crate::error::CompositeError;
use crate::image::{decode_png, PdfImage};
use crate::placement::{Dimensions, Placement};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};

/// Upper bound on `/Parent` hops when resolving inherited page attributes
const MAX_INHERITANCE_DEPTH: usize = 32;

/// Prefix for XObject resource names assigned to embedded signatures
const XOBJECT_PREFIX: &str = "SigImage";

/// A page handle with its MediaBox size
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PdfPage {
    pub index: usize,
    pub id: ObjectId,
    pub width: f64,
    pub height: f64,
}

impl PdfPage {
    pub fn size(&self) -> Dimensions {
        Dimensions::new(self.width, self.height)
    }
}

/// An image XObject registered in the document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageHandle {
    pub id: ObjectId,
    pub width: u32,
    pub height: u32,
}

impl ImageHandle {
    /// Native pixel size multiplied by `factor`
    pub fn scale(&self, factor: f64) -> Dimensions {
        Dimensions::new(self.width as f64, self.height as f64).scale(factor)
    }
}

/// An image drawn on a page, as read back from its content stream
#[derive(Debug, Clone, PartialEq)]
pub struct DrawnImage {
    pub name: Vec<u8>,
    pub placement: Placement,
}

/// Wrapper around lopdf::Document
pub struct PdfDocument {
    doc: Document,
}

impl PdfDocument {
    /// Parse PDF bytes into an editable model
    pub fn load(bytes: &[u8]) -> Result<Self, CompositeError> {
        let doc = Document::load_mem(bytes).map_err(|e| CompositeError::Parse(e.to_string()))?;
        Ok(Self { doc })
    }

    pub fn from_document(doc: Document) -> Self {
        Self { doc }
    }

    pub fn page_count(&self) -> usize {
        self.doc.get_pages().len()
    }

    /// Page object IDs in document order
    pub fn page_ids(&self) -> Vec<ObjectId> {
        self.doc.get_pages().into_values().collect()
    }

    /// Look up a page by zero-based index
    pub fn page(&self, index: usize) -> Result<PdfPage, CompositeError> {
        let ids = self.page_ids();
        if ids.is_empty() {
            return Err(CompositeError::NoPages);
        }
        let id = *ids.get(index).ok_or_else(|| {
            CompositeError::Parse(format!(
                "page index {} out of range ({} pages)",
                index,
                ids.len()
            ))
        })?;

        let [_, _, width, height] = self.media_box(id)?;
        Ok(PdfPage {
            index,
            id,
            width,
            height,
        })
    }

    /// Decode a PNG and register it as an image XObject
    pub fn embed_png(&mut self, png: &[u8]) -> Result<ImageHandle, CompositeError> {
        let image = decode_png(png)?;
        let handle = self.add_image(&image);
        tracing::debug!(
            "Embedded {}x{} PNG as object {:?} (alpha: {})",
            image.width,
            image.height,
            handle.id,
            image.alpha_data.is_some()
        );
        Ok(handle)
    }

    fn add_image(&mut self, image: &PdfImage) -> ImageHandle {
        let mut dict = dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => i64::from(image.width),
            "Height" => i64::from(image.height),
            "ColorSpace" => Object::Name(image.color_space.pdf_name().to_vec()),
            "BitsPerComponent" => 8,
            "Filter" => "FlateDecode",
        };

        if let Some(alpha) = &image.alpha_data {
            let smask = dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => i64::from(image.width),
                "Height" => i64::from(image.height),
                "ColorSpace" => "DeviceGray",
                "BitsPerComponent" => 8,
                "Filter" => "FlateDecode",
            };
            let smask_id = self
                .doc
                .add_object(Stream::new(smask, alpha.clone()).with_compression(false));
            dict.set("SMask", Object::Reference(smask_id));
        }

        let id = self
            .doc
            .add_object(Stream::new(dict, image.color_data.clone()).with_compression(false));

        ImageHandle {
            id,
            width: image.width,
            height: image.height,
        }
    }

    /// Draw an embedded image onto a page at `placement`
    ///
    /// The page's existing content is wrapped in `q ... Q` so any graphics
    /// state it leaves behind does not leak into the image transform.
    pub fn draw_image(
        &mut self,
        page: &PdfPage,
        image: &ImageHandle,
        placement: &Placement,
    ) -> Result<(), CompositeError> {
        let name = self.register_xobject(page.id, image.id)?;

        let draw = Content {
            operations: vec![
                Operation::new("Q", vec![]),
                Operation::new("q", vec![]),
                Operation::new(
                    "cm",
                    vec![
                        (placement.width as f32).into(),
                        0.into(),
                        0.into(),
                        (placement.height as f32).into(),
                        (placement.x as f32).into(),
                        (placement.y as f32).into(),
                    ],
                ),
                Operation::new("Do", vec![Object::Name(name.clone().into_bytes())]),
                Operation::new("Q", vec![]),
            ],
        };
        let mut encoded = b"\n".to_vec();
        encoded.extend(
            draw.encode()
                .map_err(|e| CompositeError::Serialize(e.to_string()))?,
        );

        let existing = self.content_refs(page.id)?;
        let open_id = self
            .doc
            .add_object(Stream::new(Dictionary::new(), b"q\n".to_vec()));
        let draw_id = self.doc.add_object(Stream::new(Dictionary::new(), encoded));

        let mut contents = Vec::with_capacity(existing.len() + 2);
        contents.push(Object::Reference(open_id));
        contents.extend(existing);
        contents.push(Object::Reference(draw_id));

        self.page_dict_mut(page.id)?
            .set("Contents", Object::Array(contents));

        tracing::debug!(
            "Drew /{} on page {} at ({:.2}, {:.2}) size {:.2}x{:.2}",
            name,
            page.index,
            placement.x,
            placement.y,
            placement.width,
            placement.height
        );
        Ok(())
    }

    /// Serialize the document to bytes
    pub fn save(&mut self) -> Result<Vec<u8>, CompositeError> {
        let mut buffer = Vec::new();
        self.doc
            .save_to(&mut buffer)
            .map_err(|e| CompositeError::Serialize(e.to_string()))?;
        Ok(buffer)
    }

    /// IDs of image XObjects reachable from a page's resources
    pub fn embedded_images(&self, page_id: ObjectId) -> Result<Vec<ObjectId>, CompositeError> {
        let resources = self.effective_resources(page_id)?;
        let xobjects = match resources.get(b"XObject") {
            Ok(obj) => self.resolve(obj)?.as_dict().map_err(|_| {
                CompositeError::Parse("XObject resource is not a dictionary".to_string())
            })?,
            Err(_) => return Ok(Vec::new()),
        };

        let mut images = Vec::new();
        for (_, obj) in xobjects.iter() {
            let Ok(id) = obj.as_reference() else {
                continue;
            };
            let is_image = self
                .doc
                .get_object(id)
                .and_then(Object::as_stream)
                .map(|stream| is_image_subtype(&stream.dict))
                .unwrap_or(false);
            if is_image {
                images.push(id);
            }
        }
        Ok(images)
    }

    /// Images painted by `Do` on a page, with the transform in effect
    pub fn image_placements(&self, page_id: ObjectId) -> Result<Vec<DrawnImage>, CompositeError> {
        let bytes = self
            .doc
            .get_page_content(page_id)
            .map_err(|e| CompositeError::Parse(e.to_string()))?;
        let content = Content::decode(&bytes).map_err(|e| CompositeError::Parse(e.to_string()))?;

        let mut ctm = IDENTITY;
        let mut stack: Vec<[f64; 6]> = Vec::new();
        let mut drawn = Vec::new();

        for op in &content.operations {
            match op.operator.as_str() {
                "q" => stack.push(ctm),
                "Q" => ctm = stack.pop().unwrap_or(IDENTITY),
                "cm" if op.operands.len() == 6 => {
                    let mut m = [0.0; 6];
                    for (slot, operand) in m.iter_mut().zip(&op.operands) {
                        *slot = number(operand)?;
                    }
                    ctm = concat(m, ctm);
                }
                "Do" => {
                    if let Some(Object::Name(name)) = op.operands.first() {
                        drawn.push(DrawnImage {
                            name: name.clone(),
                            placement: Placement {
                                x: ctm[4],
                                y: ctm[5],
                                width: ctm[0],
                                height: ctm[3],
                            },
                        });
                    }
                }
                _ => {}
            }
        }
        Ok(drawn)
    }

    /// MediaBox as [x, y, width, height], inherited through `/Parent`
    fn media_box(&self, page_id: ObjectId) -> Result<[f64; 4], CompositeError> {
        let mut current = page_id;
        for _ in 0..MAX_INHERITANCE_DEPTH {
            let dict = self.dictionary(current)?;
            if let Ok(media_box) = dict.get(b"MediaBox") {
                return self.parse_rect(media_box);
            }
            match dict.get(b"Parent").and_then(Object::as_reference) {
                Ok(parent) => current = parent,
                Err(_) => break,
            }
        }

        // Default to US Letter size
        Ok([0.0, 0.0, 612.0, 792.0])
    }

    /// The page's `/Resources`, inherited through `/Parent`, as an owned copy
    fn effective_resources(&self, page_id: ObjectId) -> Result<Dictionary, CompositeError> {
        let mut current = page_id;
        for _ in 0..MAX_INHERITANCE_DEPTH {
            let dict = self.dictionary(current)?;
            if let Ok(resources) = dict.get(b"Resources") {
                return self
                    .resolve(resources)?
                    .as_dict()
                    .cloned()
                    .map_err(|_| CompositeError::Parse("Resources is not a dictionary".to_string()));
            }
            match dict.get(b"Parent").and_then(Object::as_reference) {
                Ok(parent) => current = parent,
                Err(_) => break,
            }
        }
        Ok(Dictionary::new())
    }

    /// Add `image_id` to the page's XObject resources under a fresh name
    ///
    /// Inherited or shared resource dictionaries are copied onto the page so
    /// other pages are left untouched.
    fn register_xobject(
        &mut self,
        page_id: ObjectId,
        image_id: ObjectId,
    ) -> Result<String, CompositeError> {
        let mut resources = self.effective_resources(page_id)?;
        let mut xobjects = match resources.get(b"XObject") {
            Ok(obj) => self.resolve(obj)?.as_dict().cloned().map_err(|_| {
                CompositeError::Parse("XObject resource is not a dictionary".to_string())
            })?,
            Err(_) => Dictionary::new(),
        };

        let name = (1..)
            .map(|n| format!("{}{}", XOBJECT_PREFIX, n))
            .find(|candidate| !xobjects.has(candidate.as_bytes()))
            .unwrap_or_else(|| XOBJECT_PREFIX.to_string());

        xobjects.set(name.clone(), Object::Reference(image_id));
        resources.set("XObject", Object::Dictionary(xobjects));
        self.page_dict_mut(page_id)?
            .set("Resources", Object::Dictionary(resources));

        Ok(name)
    }

    /// Existing content streams of a page as a flat list of objects
    fn content_refs(&self, page_id: ObjectId) -> Result<Vec<Object>, CompositeError> {
        let dict = self.dictionary(page_id)?;
        let contents = match dict.get(b"Contents") {
            Ok(obj) => obj,
            Err(_) => return Ok(Vec::new()),
        };

        match contents {
            Object::Array(items) => Ok(items.clone()),
            Object::Reference(id) => match self.doc.get_object(*id) {
                Ok(Object::Array(items)) => Ok(items.clone()),
                Ok(_) => Ok(vec![Object::Reference(*id)]),
                Err(e) => Err(CompositeError::Parse(format!(
                    "Failed to resolve page contents: {}",
                    e
                ))),
            },
            _ => Err(CompositeError::Parse(
                "Page contents is neither a stream nor an array".to_string(),
            )),
        }
    }

    fn dictionary(&self, id: ObjectId) -> Result<&Dictionary, CompositeError> {
        self.doc
            .get_object(id)
            .map_err(|e| CompositeError::Parse(format!("Failed to get object {:?}: {}", id, e)))?
            .as_dict()
            .map_err(|_| CompositeError::Parse(format!("Object {:?} is not a dictionary", id)))
    }

    fn page_dict_mut(&mut self, page_id: ObjectId) -> Result<&mut Dictionary, CompositeError> {
        self.doc
            .get_object_mut(page_id)
            .map_err(|e| CompositeError::Parse(format!("Failed to get page object: {}", e)))?
            .as_dict_mut()
            .map_err(|_| CompositeError::Parse("Page is not a dictionary".to_string()))
    }

    /// Follow a single indirect reference
    fn resolve<'a>(&'a self, obj: &'a Object) -> Result<&'a Object, CompositeError> {
        match obj {
            Object::Reference(id) => self
                .doc
                .get_object(*id)
                .map_err(|e| CompositeError::Parse(format!("Failed to resolve reference: {}", e))),
            other => Ok(other),
        }
    }

    /// Parse a PDF rectangle array into [x, y, width, height]
    fn parse_rect(&self, obj: &Object) -> Result<[f64; 4], CompositeError> {
        let arr = self
            .resolve(obj)?
            .as_array()
            .map_err(|_| CompositeError::Parse("MediaBox is not an array".to_string()))?;

        if arr.len() != 4 {
            return Err(CompositeError::Parse(format!(
                "MediaBox has {} elements, expected 4",
                arr.len()
            )));
        }

        let mut values = [0.0f64; 4];
        for (slot, obj) in values.iter_mut().zip(arr) {
            *slot = number(self.resolve(obj)?)?;
        }

        // Convert from [x1, y1, x2, y2] to [x, y, width, height]
        Ok([
            values[0],
            values[1],
            values[2] - values[0],
            values[3] - values[1],
        ])
    }
}

const IDENTITY: [f64; 6] = [1.0, 0.0, 0.0, 1.0, 0.0, 0.0];

/// `m × ctm` for PDF affine matrices [a b c d e f]
fn concat(m: [f64; 6], ctm: [f64; 6]) -> [f64; 6] {
    [
        m[0] * ctm[0] + m[1] * ctm[2],
        m[0] * ctm[1] + m[1] * ctm[3],
        m[2] * ctm[0] + m[3] * ctm[2],
        m[2] * ctm[1] + m[3] * ctm[3],
        m[4] * ctm[0] + m[5] * ctm[2] + ctm[4],
        m[4] * ctm[1] + m[5] * ctm[3] + ctm[5],
    ]
}

fn number(obj: &Object) -> Result<f64, CompositeError> {
    match obj {
        Object::Integer(i) => Ok(*i as f64),
        Object::Real(r) => Ok(*r as f64),
        _ => Err(CompositeError::Parse("Expected number".to_string())),
    }
}

fn is_image_subtype(dict: &Dictionary) -> bool {
    matches!(dict.get(b"Subtype"), Ok(Object::Name(name)) if name == b"Image")
}
