use super::Test;
use anyhow::{Context as _, Result};
use quad_engine::{imgui::Ui, prelude::*};

const TEXTURE_PATH: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/res/textures/quad.png");
const DEFAULT_TINT: [f32; 4] = [0.8, 0.3, 0.8, 1.0];

/// Two instances of a textured quad positioned in pixel coordinates.
#[derive(Debug)]
pub(crate) struct TestTexture2D {
    projection: Mat4,
    view: Mat4,
    translation_a: Vec3,
    translation_b: Vec3,
    tint: [f32; 4],
    texture: Texture,
    shader: Shader,
    index_buffer: IndexBuffer,
    vertex_array: VertexArray,
    _vertex_buffer: VertexBuffer,
}

impl TestTexture2D {
    /// Position and texture coordinate for each corner of a 100x100 quad centered on the origin.
    #[rustfmt::skip]
    const VERTICES: [f32; 16] = [
        -50.0, -50.0, 0.0, 0.0, // 0
         50.0, -50.0, 1.0, 0.0, // 1
         50.0,  50.0, 1.0, 1.0, // 2
        -50.0,  50.0, 0.0, 1.0, // 3
    ];
    const INDICES: [u32; 6] = [0, 1, 2, 2, 3, 0];

    pub(crate) fn new(cx: &mut Context) -> Result<Self> {
        let gl = Gl::clone(cx.gl());
        cx.renderer().enable_blending()?;

        let vertex_buffer = VertexBuffer::new(&gl, &Self::VERTICES)?;
        let vertex_array = VertexArray::new(&gl)?;
        let layout = VertexBufferLayout::new().with::<f32>(2).with::<f32>(2);
        vertex_array.add_buffer(&vertex_buffer, &layout)?;
        let index_buffer = IndexBuffer::new(&gl, &Self::INDICES)?;

        let mut shader = Shader::from_paths(
            &gl,
            concat!(env!("CARGO_MANIFEST_DIR"), "/res/shaders/basic.vert"),
            concat!(env!("CARGO_MANIFEST_DIR"), "/res/shaders/basic.frag"),
        )
        .context("failed to load texture shader")?;

        let texture = match Texture::from_path(&gl, TEXTURE_PATH) {
            Ok(texture) => texture,
            Err(err) => {
                tracing::warn!("{err}, using a checkerboard texture instead");
                Texture::new(&gl, &checkerboard(64, 8)?)?
            }
        };

        shader.bind()?;
        shader.set_uniform_1i("u_Texture", 0)?;

        Ok(Self {
            projection: Mat4::orthographic(0.0, 960.0, 0.0, 540.0, -1.0, 1.0),
            view: Mat4::translation([0.0, 0.0, 0.0]),
            translation_a: Vec3::new(200.0, 200.0, 0.0),
            translation_b: Vec3::new(400.0, 200.0, 0.0),
            tint: DEFAULT_TINT,
            texture,
            shader,
            index_buffer,
            vertex_array,
            _vertex_buffer: vertex_buffer,
        })
    }

    /// Model-view-projection matrix for a quad instance at `translation`.
    fn mvp(&self, translation: Vec3) -> Mat4 {
        self.projection * self.view * Mat4::translation(translation)
    }
}

impl Test for TestTexture2D {
    fn on_render(&mut self, cx: &mut Context) -> Result<()> {
        self.texture.bind(0)?;
        let [r, g, b, a] = self.tint;
        self.shader.bind()?;
        self.shader.set_uniform_4f("u_Color", r, g, b, a)?;

        for translation in [self.translation_a, self.translation_b] {
            let mvp = self.mvp(translation);
            self.shader.set_uniform_mat4("u_MVP", &mvp)?;
            cx.renderer()
                .draw(&self.vertex_array, &self.index_buffer, &self.shader)?;
        }
        Ok(())
    }

    fn on_imgui_render(&mut self, ui: &Ui) {
        ui.slider_config("Translation A", 0.0, 1000.0)
            .build_array(self.translation_a.as_array_mut());
        ui.slider_config("Translation B", 0.0, 1000.0)
            .build_array(self.translation_b.as_array_mut());
        ui.color_edit4("Tint", &mut self.tint);
    }
}

/// Grey and white squares of `cell` pixels, used when the texture file can't be loaded.
fn checkerboard(size: u32, cell: u32) -> quad_engine::Result<TextureImage> {
    let cell = cell.max(1);
    let pixels = (0..size)
        .flat_map(|y| (0..size).map(move |x| (x, y)))
        .flat_map(|(x, y)| {
            let shade = if (x / cell + y / cell) % 2 == 0 { 0xFF } else { 0x80 };
            [shade, shade, shade, 0xFF]
        })
        .collect();
    TextureImage::from_rgba(size, size, pixels)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checkerboard_alternates_cells() {
        let image = checkerboard(4, 2).expect("valid image");
        assert_eq!((image.width(), image.height()), (4, 4));
        let bytes = image.as_bytes();
        let pixel = |x: usize, y: usize| bytes[(y * 4 + x) * 4];
        assert_eq!(pixel(0, 0), 0xFF);
        assert_eq!(pixel(1, 1), 0xFF);
        assert_eq!(pixel(2, 0), 0x80);
        assert_eq!(pixel(0, 2), 0x80);
        assert_eq!(pixel(2, 2), 0xFF);
        assert!(bytes.chunks_exact(4).all(|pixel| pixel[3] == 0xFF));
    }

    #[test]
    fn default_tint_is_opaque_magenta() {
        let [r, g, b, a] = DEFAULT_TINT;
        assert!((r - 0.8).abs() < f32::EPSILON && (b - 0.8).abs() < f32::EPSILON);
        assert!((g - 0.3).abs() < f32::EPSILON);
        assert!((a - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn quad_instances_land_at_their_translation() {
        let projection = Mat4::orthographic(0.0, 960.0, 0.0, 540.0, -1.0, 1.0);
        let mvp = projection * Mat4::translation([480.0, 270.0, 0.0]);
        let center = mvp * Vec4::new(0.0, 0.0, 0.0, 1.0);
        assert!(center.x.abs() < 1e-6 && center.y.abs() < 1e-6);

        let corner = mvp * Vec4::new(50.0, 50.0, 0.0, 1.0);
        assert!((corner.x - 100.0 / 960.0).abs() < 1e-6);
        assert!((corner.y - 100.0 / 540.0).abs() < 1e-6);
    }
}
