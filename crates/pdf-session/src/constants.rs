//! Shared constants for the editing session
//!
//! Defaults for every tunable live here; `SessionOptions` copies them so
//! callers can override individual values.

// =============================================================================
// Render Scales
// =============================================================================

/// Scale used to rasterize the page shown in the editor
pub const DISPLAY_SCALE: f32 = 1.5;

/// Scale used to rasterize pages for document export, independent of zoom
pub const EXPORT_SCALE: f32 = 2.0;

/// Scale for organize/split grid thumbnails
pub const THUMBNAIL_SCALE: f32 = 0.3;

/// Scale for the enlarged hover preview in organize/split grids
pub const PREVIEW_SCALE: f32 = 1.0;

// =============================================================================
// Zoom
// =============================================================================

pub const MIN_ZOOM: f32 = 0.2;
pub const MAX_ZOOM: f32 = 3.0;

/// Zoom change applied per pinch step
pub const ZOOM_STEP: f32 = 0.05;

/// Horizontal padding subtracted from the workspace width when fitting a page
pub const FIT_PADDING_PX: f32 = 40.0;

// =============================================================================
// History
// =============================================================================

/// Maximum number of undo entries kept for the active page
pub const HISTORY_CAPACITY: usize = 50;

// =============================================================================
// Export
// =============================================================================

/// JPEG quality for rasterized pages embedded in exported documents
pub const JPEG_QUALITY: u8 = 80;

/// Default page width in points (US Letter: 8.5" × 11")
pub const DEFAULT_PAGE_WIDTH_PT: f32 = 612.0;

/// Default page height in points (US Letter)
pub const DEFAULT_PAGE_HEIGHT_PT: f32 = 792.0;

/// Default page dimensions as tuple (width, height)
pub const DEFAULT_PAGE_DIMENSIONS: (f32, f32) = (DEFAULT_PAGE_WIDTH_PT, DEFAULT_PAGE_HEIGHT_PT);

pub const DEFAULT_EDITOR_NAME: &str = "Edited_Document";
pub const DEFAULT_ORGANIZE_NAME: &str = "Organized_Doc";
pub const DEFAULT_SPLIT_NAME: &str = "Extracted_Pages";
pub const DEFAULT_MERGE_NAME: &str = "Merged_Doc";

/// Minimum number of queued files for a merge
pub const MIN_MERGE_FILES: usize = 2;

// =============================================================================
// Editor Tools
// =============================================================================

/// Width in pixels that inserted images are scaled to
pub const IMAGE_TARGET_WIDTH: u32 = 200;

/// Placeholder content for freshly placed text
pub const DEFAULT_TEXT: &str = "Type here...";

pub const DEFAULT_FONT_FAMILY: &str = "Arial";

pub const DEFAULT_TOOL_SIZE: u32 = 20;

/// Pen stroke width is the tool size divided by this
pub const PEN_WIDTH_DIVISOR: f32 = 4.0;

/// Highlighter stroke width is the tool size multiplied by this
pub const HIGHLIGHTER_WIDTH_FACTOR: f32 = 1.5;

/// Highlighter alpha (0.3 opacity)
pub const HIGHLIGHTER_ALPHA: u8 = 77;

/// Stroke width used by the signature pad
pub const SIGNATURE_STROKE_WIDTH: f32 = 3.0;

pub const SIGNATURE_PAD_SIZE: (u32, u32) = (400, 150);
