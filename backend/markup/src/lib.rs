mod dom;
pub mod processor;

pub use processor::{
    make_editable, normalize_layout, process_edited, process_generated, serialize,
    set_body_background,
};
