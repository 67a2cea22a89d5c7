//! ### English
//! Shader program, quad buffer and framebuffer used to copy an imported `EGLImage` into the
//! persistent texture.
//!
//! ### 中文
//! 将导入的 `EGLImage` 复制进持久纹理所用的着色器程序、四边形缓冲与 framebuffer。

use std::ffi::c_void;
use std::rc::Rc;

use dpi::PhysicalSize;
use gleam::gl::{self, Gl};

use crate::engine::error::{BridgeError, BridgeResult};
use crate::engine::frame::{EglImage, TextureId};

/// ### English
/// `glEGLImageTargetTexture2DOES`.
///
/// ### 中文
/// `glEGLImageTargetTexture2DOES`。
pub(super) type ImageTargetTexture2dOes = unsafe extern "C" fn(target: gl::GLenum, image: *mut c_void);

const VERTEX_SHADER: &str = "attribute vec2 pos;
attribute vec2 texture;
varying vec2 v_texture;
void main() {
  v_texture = texture;
  gl_Position = vec4(pos, 0, 1);
}
";

const FRAGMENT_SHADER: &str = "precision mediump float;
uniform sampler2D u_texture;
varying vec2 v_texture;
void main() {
  gl_FragColor = texture2D(u_texture, v_texture);
}
";

const POSITION_ATTRIBUTE: gl::GLuint = 0;
const TEXCOORD_ATTRIBUTE: gl::GLuint = 1;

// Interleaved `pos.xy, texture.uv` for a triangle strip covering clip space.
const QUAD: [f32; 16] = [
    -1.0, 1.0, 0.0, 0.0, //
    1.0, 1.0, 1.0, 0.0, //
    -1.0, -1.0, 0.0, 1.0, //
    1.0, -1.0, 1.0, 1.0,
];
const QUAD_STRIDE: gl::GLsizei = 4 * size_of::<f32>() as gl::GLsizei;
const TEXCOORD_OFFSET: gl::GLuint = 2 * size_of::<f32>() as gl::GLuint;

fn compile_shader(gl: &Rc<dyn Gl>, kind: gl::GLenum, source: &str) -> BridgeResult<gl::GLuint> {
    let shader = gl.create_shader(kind);
    gl.shader_source(shader, &[source.as_bytes()]);
    gl.compile_shader(shader);

    let mut status = [0];
    unsafe { gl.get_shader_iv(shader, gl::COMPILE_STATUS, &mut status) };
    if status[0] == 0 {
        let log = gl.get_shader_info_log(shader);
        gl.delete_shader(shader);
        return Err(BridgeError::ShaderCompile(log));
    }
    Ok(shader)
}

/// ### English
/// GL objects owned by the private context for the per-frame copy.
///
/// ### 中文
/// 私有上下文为逐帧复制持有的 GL 对象。
pub(super) struct BlitProgram {
    program: gl::GLuint,
    texture_uniform: gl::GLint,
    quad_buffer: gl::GLuint,
    framebuffer: gl::GLuint,
    /// ### English
    /// Texture the foreign image is bound to as the sampling source.
    ///
    /// ### 中文
    /// 外部图像作为采样源所绑定的纹理。
    import_texture: gl::GLuint,
}

impl BlitProgram {
    /// ### English
    /// Compiles and links the shader pair and creates the quad buffer, framebuffer and import
    /// texture. Attribute locations are bound before linking so they take effect.
    ///
    /// ### 中文
    /// 编译并链接着色器对，创建四边形缓冲、framebuffer 与导入纹理。
    /// attribute 位置在链接前绑定，以确保生效。
    pub(super) fn new(gl: &Rc<dyn Gl>) -> BridgeResult<Self> {
        let vertex = compile_shader(gl, gl::VERTEX_SHADER, VERTEX_SHADER)?;
        let fragment = match compile_shader(gl, gl::FRAGMENT_SHADER, FRAGMENT_SHADER) {
            Ok(fragment) => fragment,
            Err(err) => {
                gl.delete_shader(vertex);
                return Err(err);
            }
        };

        let program = gl.create_program();
        gl.attach_shader(program, vertex);
        gl.attach_shader(program, fragment);
        gl.bind_attrib_location(program, POSITION_ATTRIBUTE, "pos");
        gl.bind_attrib_location(program, TEXCOORD_ATTRIBUTE, "texture");
        gl.link_program(program);
        gl.detach_shader(program, vertex);
        gl.detach_shader(program, fragment);
        gl.delete_shader(vertex);
        gl.delete_shader(fragment);

        let mut status = [0];
        unsafe { gl.get_program_iv(program, gl::LINK_STATUS, &mut status) };
        if status[0] == 0 {
            let log = gl.get_program_info_log(program);
            gl.delete_program(program);
            return Err(BridgeError::ProgramLink(log));
        }
        let texture_uniform = gl.get_uniform_location(program, "u_texture");

        let quad_buffer = gl.gen_buffers(1)[0];
        gl.bind_buffer(gl::ARRAY_BUFFER, quad_buffer);
        gl::buffer_data(&**gl, gl::ARRAY_BUFFER, &QUAD, gl::STATIC_DRAW);
        gl.bind_buffer(gl::ARRAY_BUFFER, 0);

        let framebuffer = gl.gen_framebuffers(1)[0];

        let import_texture = gl.gen_textures(1)[0];
        gl.bind_texture(gl::TEXTURE_2D, import_texture);
        gl.tex_parameter_i(gl::TEXTURE_2D, gl::TEXTURE_MIN_FILTER, gl::LINEAR as gl::GLint);
        gl.tex_parameter_i(gl::TEXTURE_2D, gl::TEXTURE_MAG_FILTER, gl::LINEAR as gl::GLint);
        gl.tex_parameter_i(gl::TEXTURE_2D, gl::TEXTURE_WRAP_S, gl::CLAMP_TO_EDGE as gl::GLint);
        gl.tex_parameter_i(gl::TEXTURE_2D, gl::TEXTURE_WRAP_T, gl::CLAMP_TO_EDGE as gl::GLint);
        gl.bind_texture(gl::TEXTURE_2D, 0);

        Ok(Self {
            program,
            texture_uniform,
            quad_buffer,
            framebuffer,
            import_texture,
        })
    }

    /// ### English
    /// Renders `image` into `target` as a full-viewport quad.
    ///
    /// #### Parameters
    /// - `gl`: GL API of the private context (must be current).
    /// - `image_target`: Resolved `glEGLImageTargetTexture2DOES`.
    /// - `target`: Persistent texture, used as the framebuffer color attachment.
    /// - `image`: Foreign image to sample from.
    /// - `viewport`: Target size in pixels.
    ///
    /// ### 中文
    /// 以铺满视口的四边形把 `image` 渲染进 `target`。
    ///
    /// #### 参数
    /// - `gl`：私有上下文的 GL API（必须为 current）。
    /// - `image_target`：已解析的 `glEGLImageTargetTexture2DOES`。
    /// - `target`：持久纹理，作为 framebuffer 的颜色附件。
    /// - `image`：作为采样源的外部图像。
    /// - `viewport`：目标尺寸（像素）。
    pub(super) fn draw(
        &self,
        gl: &Rc<dyn Gl>,
        image_target: ImageTargetTexture2dOes,
        target: TextureId,
        image: EglImage,
        viewport: PhysicalSize<u32>,
    ) {
        gl.bind_framebuffer(gl::FRAMEBUFFER, self.framebuffer);
        gl.framebuffer_texture_2d(
            gl::FRAMEBUFFER,
            gl::COLOR_ATTACHMENT0,
            gl::TEXTURE_2D,
            target,
            0,
        );
        let status = gl.check_frame_buffer_status(gl::FRAMEBUFFER);
        if status != gl::FRAMEBUFFER_COMPLETE {
            log::warn!("blit framebuffer incomplete ({status:#x}), skipping frame copy");
            gl.bind_framebuffer(gl::FRAMEBUFFER, 0);
            return;
        }

        gl.viewport(
            0,
            0,
            viewport.width as gl::GLsizei,
            viewport.height as gl::GLsizei,
        );
        gl.clear_color(0.0, 0.0, 0.0, 0.0);
        gl.clear(gl::COLOR_BUFFER_BIT);

        gl.use_program(self.program);
        gl.active_texture(gl::TEXTURE0);
        gl.bind_texture(gl::TEXTURE_2D, self.import_texture);
        unsafe { image_target(gl::TEXTURE_2D, image.0) };
        gl.uniform_1i(self.texture_uniform, 0);

        gl.bind_buffer(gl::ARRAY_BUFFER, self.quad_buffer);
        gl.vertex_attrib_pointer(POSITION_ATTRIBUTE, 2, gl::FLOAT, false, QUAD_STRIDE, 0);
        gl.vertex_attrib_pointer(
            TEXCOORD_ATTRIBUTE,
            2,
            gl::FLOAT,
            false,
            QUAD_STRIDE,
            TEXCOORD_OFFSET,
        );
        gl.enable_vertex_attrib_array(POSITION_ATTRIBUTE);
        gl.enable_vertex_attrib_array(TEXCOORD_ATTRIBUTE);

        gl.draw_arrays(gl::TRIANGLE_STRIP, 0, 4);

        gl.disable_vertex_attrib_array(POSITION_ATTRIBUTE);
        gl.disable_vertex_attrib_array(TEXCOORD_ATTRIBUTE);
        gl.bind_buffer(gl::ARRAY_BUFFER, 0);
        gl.bind_texture(gl::TEXTURE_2D, 0);
        gl.use_program(0);
        gl.framebuffer_texture_2d(gl::FRAMEBUFFER, gl::COLOR_ATTACHMENT0, gl::TEXTURE_2D, 0, 0);
        gl.bind_framebuffer(gl::FRAMEBUFFER, 0);
    }

    pub(super) fn delete(&self, gl: &Rc<dyn Gl>) {
        gl.delete_textures(&[self.import_texture]);
        gl.delete_framebuffers(&[self.framebuffer]);
        gl.delete_buffers(&[self.quad_buffer]);
        gl.delete_program(self.program);
    }
}

/// ### English
/// Allocates the persistent RGBA texture the host samples.
///
/// ### 中文
/// 分配宿主采样的持久 RGBA 纹理。
pub(super) fn create_target_texture(gl: &Rc<dyn Gl>, size: PhysicalSize<u32>) -> TextureId {
    let texture = gl.gen_textures(1)[0];
    gl.bind_texture(gl::TEXTURE_2D, texture);
    gl.tex_parameter_i(gl::TEXTURE_2D, gl::TEXTURE_WRAP_S, gl::CLAMP_TO_EDGE as gl::GLint);
    gl.tex_parameter_i(gl::TEXTURE_2D, gl::TEXTURE_WRAP_T, gl::CLAMP_TO_EDGE as gl::GLint);
    gl.tex_parameter_i(gl::TEXTURE_2D, gl::TEXTURE_MIN_FILTER, gl::NEAREST as gl::GLint);
    gl.tex_parameter_i(gl::TEXTURE_2D, gl::TEXTURE_MAG_FILTER, gl::NEAREST as gl::GLint);
    allocate_storage(gl, size);
    gl.bind_texture(gl::TEXTURE_2D, 0);
    texture
}

/// ### English
/// Replaces the storage of `texture` in place; the name stays valid on the host side.
///
/// ### 中文
/// 原地替换 `texture` 的存储；纹理名在宿主侧保持有效。
pub(super) fn resize_target_texture(gl: &Rc<dyn Gl>, texture: TextureId, size: PhysicalSize<u32>) {
    gl.bind_texture(gl::TEXTURE_2D, texture);
    allocate_storage(gl, size);
    gl.bind_texture(gl::TEXTURE_2D, 0);
}

fn allocate_storage(gl: &Rc<dyn Gl>, size: PhysicalSize<u32>) {
    gl.tex_image_2d(
        gl::TEXTURE_2D,
        0,
        gl::RGBA as gl::GLint,
        size.width as gl::GLsizei,
        size.height as gl::GLsizei,
        0,
        gl::RGBA,
        gl::UNSIGNED_BYTE,
        None,
    );
}
