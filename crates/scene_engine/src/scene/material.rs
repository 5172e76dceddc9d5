//! Material component
//!
//! Only the texture binding metadata lives here; texture upload and shader
//! state belong to the renderer.

/// Texture binding for a node's mesh
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MaterialComponent {
    /// Texture name as shown by the editor
    pub texture_name: String,
    /// Texture width in pixels
    pub width: u32,
    /// Texture height in pixels
    pub height: u32,
    /// Renderer-side texture handle, 0 when none is bound
    pub texture_id: u32,
}

impl MaterialComponent {
    /// Material bound to an already uploaded texture
    pub fn with_texture(name: impl Into<String>, texture_id: u32, width: u32, height: u32) -> Self {
        Self {
            texture_name: name.into(),
            width,
            height,
            texture_id,
        }
    }

    /// Texture handle, if one is bound
    pub fn texture(&self) -> Option<u32> {
        (self.texture_id != 0).then_some(self.texture_id)
    }
}
