//! Output document construction
//!
//! [`OutputDocument`] owns the poster being built. Pages are appended in
//! order through a [`Canvas`], and [`OutputDocument::finish`] writes the
//! page tree and catalog.

use crate::constants::OUTPUT_PDF_VERSION;
use crate::types::{PageSize, Result};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use std::collections::HashMap;

/// A poster document under construction
pub struct OutputDocument {
    document: Document,
    pages_tree_id: ObjectId,
    page_refs: Vec<Object>,
    page_sizes: Vec<PageSize>,
    /// Source object id -> copied object id, shared by every imported form
    object_cache: HashMap<ObjectId, ObjectId>,
    /// Source page id -> the form XObjects painting it
    form_cache: HashMap<ObjectId, Vec<ObjectId>>,
}

impl OutputDocument {
    pub fn new() -> Self {
        let mut document = Document::with_version(OUTPUT_PDF_VERSION);
        let pages_tree_id = document.new_object_id();
        Self {
            document,
            pages_tree_id,
            page_refs: Vec::new(),
            page_sizes: Vec::new(),
            object_cache: HashMap::new(),
            form_cache: HashMap::new(),
        }
    }

    /// Start a new page of the given size. The page is appended when the
    /// canvas is finished.
    pub fn begin_page(&mut self, size: PageSize) -> Canvas<'_> {
        Canvas {
            output: self,
            size,
            content_ops: Vec::new(),
            xobjects: Dictionary::new(),
        }
    }

    /// Number of pages appended so far
    pub fn page_count(&self) -> usize {
        self.page_refs.len()
    }

    /// Sizes of the appended pages, in order
    pub fn page_sizes(&self) -> &[PageSize] {
        &self.page_sizes
    }

    /// Write the page tree and catalog, yielding the finished document
    pub fn finish(mut self) -> Document {
        let count = self.page_refs.len() as i64;
        let pages_dict = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Pages".to_vec())),
            ("Kids", Object::Array(self.page_refs)),
            ("Count", Object::Integer(count)),
        ]);
        self.document
            .objects
            .insert(self.pages_tree_id, Object::Dictionary(pages_dict));

        let catalog_id = self.document.add_object(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Catalog".to_vec())),
            ("Pages", Object::Reference(self.pages_tree_id)),
        ]));
        self.document.trailer.set("Root", catalog_id);

        self.document
    }
}

impl Default for OutputDocument {
    fn default() -> Self {
        Self::new()
    }
}

/// Drawing target for one output page
pub struct Canvas<'a> {
    output: &'a mut OutputDocument,
    size: PageSize,
    content_ops: Vec<String>,
    xobjects: Dictionary,
}

impl Canvas<'_> {
    /// Restrict all further drawing to the page bounds
    pub fn clip_to_bounds(&mut self) {
        self.content_ops.push(format!(
            "0 0 {} {} re W n\n",
            self.size.width, self.size.height
        ));
    }

    /// Get the form XObjects for a source page, importing them on first use.
    ///
    /// `import` receives the output document and the shared object cache and
    /// returns the ids of the new forms.
    pub fn import_forms<F>(&mut self, source_page_id: ObjectId, import: F) -> Result<Vec<ObjectId>>
    where
        F: FnOnce(&mut Document, &mut HashMap<ObjectId, ObjectId>) -> Result<Vec<ObjectId>>,
    {
        if let Some(form_ids) = self.output.form_cache.get(&source_page_id) {
            return Ok(form_ids.clone());
        }

        let output = &mut *self.output;
        let form_ids = import(&mut output.document, &mut output.object_cache)?;
        output.form_cache.insert(source_page_id, form_ids.clone());
        Ok(form_ids)
    }

    /// Paint a form XObject translated by `(translate_x, translate_y)`, unscaled
    pub fn draw_form(&mut self, form_id: ObjectId, translate_x: f32, translate_y: f32) {
        let xobject_name = format!("P{}", self.xobjects.len());
        self.xobjects
            .set(xobject_name.as_bytes(), Object::Reference(form_id));
        self.content_ops.push(format!(
            "q 1 0 0 1 {} {} cm /{} Do Q\n",
            translate_x, translate_y, xobject_name
        ));
    }

    /// Append the page to the output document
    pub fn finish(self) -> ObjectId {
        let Canvas {
            output,
            size,
            content_ops,
            xobjects,
        } = self;

        let mut page_dict = Dictionary::new();
        page_dict.set("Type", Object::Name(b"Page".to_vec()));
        page_dict.set("Parent", Object::Reference(output.pages_tree_id));
        page_dict.set(
            "MediaBox",
            Object::Array(vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Real(size.width),
                Object::Real(size.height),
            ]),
        );

        let mut resources = Dictionary::new();
        resources.set("XObject", Object::Dictionary(xobjects));

        // Wrap everything so the clip never leaks past this page's content
        let content = format!("q\n{}Q\n", content_ops.join(""));
        let content_id = output
            .document
            .add_object(Stream::new(Dictionary::new(), content.into_bytes()));

        page_dict.set("Contents", Object::Reference(content_id));
        page_dict.set("Resources", Object::Dictionary(resources));

        let page_id = output.document.add_object(page_dict);
        output.page_refs.push(Object::Reference(page_id));
        output.page_sizes.push(size);
        page_id
    }
}
