//! Built-in GLSL 410 programs
//!
//! Vertex attributes: 0 position, 1 normal, 2 texcoord, 3..6 per-instance
//! model matrix (divisor 1). Lighting happens in object space: the renderer
//! uploads light directions and the camera position already transformed by
//! the inverse model matrix.

/// Programs the renderer compiles on demand
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinProgram {
    /// Directional lights, ambient and optional shadows
    Lit,
    /// Flat color or texture
    Unlit,
    /// Equirectangular sky
    Skybox,
    /// Depth-only shadow caster
    Depth,
}

impl BuiltinProgram {
    /// All built-in programs
    pub const ALL: [Self; 4] = [Self::Lit, Self::Unlit, Self::Skybox, Self::Depth];

    /// Dense index
    pub fn index(self) -> usize {
        self as usize
    }

    /// Debug label
    pub fn label(self) -> &'static str {
        match self {
            Self::Lit => "builtin/lit",
            Self::Unlit => "builtin/unlit",
            Self::Skybox => "builtin/skybox",
            Self::Depth => "builtin/depth",
        }
    }

    /// `(vertex, fragment)` sources
    pub fn sources(self) -> (&'static str, &'static str) {
        match self {
            Self::Lit => (LIT_VERTEX, LIT_FRAGMENT),
            Self::Unlit => (UNLIT_VERTEX, UNLIT_FRAGMENT),
            Self::Skybox => (SKYBOX_VERTEX, SKYBOX_FRAGMENT),
            Self::Depth => (DEPTH_VERTEX, DEPTH_FRAGMENT),
        }
    }
}

/// Uniform names shared by the renderer and the built-in sources
#[allow(missing_docs)]
pub mod uniforms {
    pub const MVP: &str = "uMVP";
    pub const INSTANCED: &str = "uInstanced";
    pub const LIGHT_COUNT: &str = "uLightCount";
    pub const LIGHT_DIRECTIONS: &str = "uLightDirs";
    pub const LIGHT_COLORS: &str = "uLightColors";
    pub const AMBIENT: &str = "uAmbient";
    pub const COLOR: &str = "uColor";
    pub const SMOOTHNESS: &str = "uSmoothness";
    pub const CAMERA_POSITION: &str = "uCameraPos";
    pub const USE_TEXTURE: &str = "uUseTexture";
    pub const ALBEDO: &str = "uAlbedo";
    pub const USE_SHADOWS: &str = "uUseShadows";
    pub const SHADOW_MAP: &str = "uShadowMap";
    pub const LIGHT_SPACE_MODEL: &str = "uLightSpaceModel";
    pub const SHADOW_BIAS: &str = "uShadowBias";
    pub const PCF_RADIUS: &str = "uPcfRadius";
    pub const ADVANCED_SHADOWS: &str = "uAdvancedShadows";
    pub const CONTACT_HARDENING: &str = "uContactHardening";
    pub const VIEW_ROTATION: &str = "uViewRotation";
    pub const PROJECTION: &str = "uProjection";
    pub const SKY: &str = "uSky";
}

/// Texture unit for albedo and sky images
pub const ALBEDO_UNIT: u32 = 0;
/// Texture unit for the shadow map
pub const SHADOW_UNIT: u32 = 1;

const LIT_VERTEX: &str = r#"#version 410 core
layout(location = 0) in vec3 aPosition;
layout(location = 1) in vec3 aNormal;
layout(location = 2) in vec2 aTexCoord;
layout(location = 3) in mat4 aInstanceModel;

uniform mat4 uMVP;
uniform mat4 uLightSpaceModel;
uniform int uInstanced;

out vec3 vPosition;
out vec3 vNormal;
out vec2 vTexCoord;
out vec4 vLightSpacePos;

void main() {
    mat4 local = uInstanced == 1 ? aInstanceModel : mat4(1.0);
    vec4 objectPos = local * vec4(aPosition, 1.0);
    vPosition = objectPos.xyz;
    vNormal = mat3(local) * aNormal;
    vTexCoord = aTexCoord;
    vLightSpacePos = uLightSpaceModel * objectPos;
    gl_Position = uMVP * objectPos;
}
"#;

const LIT_FRAGMENT: &str = r#"#version 410 core
const int MAX_LIGHTS = 4;

in vec3 vPosition;
in vec3 vNormal;
in vec2 vTexCoord;
in vec4 vLightSpacePos;

uniform int uLightCount;
uniform vec3 uLightDirs[MAX_LIGHTS];
uniform vec3 uLightColors[MAX_LIGHTS];
uniform vec3 uAmbient;
uniform vec3 uColor;
uniform float uSmoothness;
uniform vec3 uCameraPos;
uniform int uUseTexture;
uniform sampler2D uAlbedo;

uniform int uUseShadows;
uniform sampler2D uShadowMap;
uniform float uShadowBias;
uniform int uPcfRadius;
uniform int uAdvancedShadows;
uniform int uContactHardening;

out vec4 FragColor;

float shadowVisibility(vec3 normal, vec3 towardLight) {
    vec3 proj = vLightSpacePos.xyz / vLightSpacePos.w * 0.5 + 0.5;
    if (proj.z > 1.0) {
        return 1.0;
    }
    float bias = max(uShadowBias * (1.0 - dot(normal, towardLight)), uShadowBias * 0.1);
    vec2 texel = 1.0 / vec2(textureSize(uShadowMap, 0));
    float visible = 0.0;
    int taps = 0;
    for (int x = -uPcfRadius; x <= uPcfRadius; ++x) {
        for (int y = -uPcfRadius; y <= uPcfRadius; ++y) {
            float closest = texture(uShadowMap, proj.xy + vec2(x, y) * texel).r;
            visible += proj.z - bias > closest ? 0.0 : 1.0;
            taps++;
        }
    }
    return visible / float(taps);
}

void main() {
    vec3 n = normalize(vNormal);
    vec3 viewDir = normalize(uCameraPos - vPosition);
    vec3 base = uColor;
    if (uUseTexture == 1) {
        base *= texture(uAlbedo, vTexCoord).rgb;
    }

    float smoothness = clamp(uSmoothness, 0.0, 1.0);
    float shininess = mix(4.0, 128.0, smoothness);
    vec3 lighting = vec3(0.0);
    for (int i = 0; i < uLightCount && i < MAX_LIGHTS; ++i) {
        vec3 l = normalize(-uLightDirs[i]);
        float diffuse = max(dot(n, l), 0.0);
        vec3 h = normalize(l + viewDir);
        float specular = diffuse > 0.0 ? pow(max(dot(n, h), 0.0), shininess) * smoothness : 0.0;
        float visibility = (i == 0 && uUseShadows == 1) ? shadowVisibility(n, l) : 1.0;
        lighting += (diffuse * base + specular) * uLightColors[i] * visibility;
    }

    FragColor = vec4(uAmbient * base + lighting, 1.0);
}
"#;

const UNLIT_VERTEX: &str = r#"#version 410 core
layout(location = 0) in vec3 aPosition;
layout(location = 2) in vec2 aTexCoord;
layout(location = 3) in mat4 aInstanceModel;

uniform mat4 uMVP;
uniform int uInstanced;

out vec2 vTexCoord;

void main() {
    mat4 local = uInstanced == 1 ? aInstanceModel : mat4(1.0);
    vTexCoord = aTexCoord;
    gl_Position = uMVP * local * vec4(aPosition, 1.0);
}
"#;

const UNLIT_FRAGMENT: &str = r#"#version 410 core
in vec2 vTexCoord;

uniform vec3 uColor;
uniform int uUseTexture;
uniform sampler2D uAlbedo;

out vec4 FragColor;

void main() {
    vec3 color = uColor;
    if (uUseTexture == 1) {
        color *= texture(uAlbedo, vTexCoord).rgb;
    }
    FragColor = vec4(color, 1.0);
}
"#;

const SKYBOX_VERTEX: &str = r#"#version 410 core
layout(location = 0) in vec3 aPosition;

uniform mat4 uViewRotation;
uniform mat4 uProjection;

out vec3 vDirection;

void main() {
    vDirection = aPosition;
    vec4 clip = uProjection * uViewRotation * vec4(aPosition, 1.0);
    gl_Position = clip.xyww;
}
"#;

const SKYBOX_FRAGMENT: &str = r#"#version 410 core
const float PI = 3.14159265359;

in vec3 vDirection;

uniform sampler2D uSky;

out vec4 FragColor;

void main() {
    vec3 d = normalize(vDirection);
    vec2 uv = vec2(0.5 + atan(d.z, d.x) / (2.0 * PI), 0.5 - asin(clamp(d.y, -1.0, 1.0)) / PI);
    FragColor = vec4(texture(uSky, uv).rgb, 1.0);
}
"#;

const DEPTH_VERTEX: &str = r#"#version 410 core
layout(location = 0) in vec3 aPosition;
layout(location = 3) in mat4 aInstanceModel;

uniform mat4 uLightSpaceModel;
uniform int uInstanced;

void main() {
    mat4 local = uInstanced == 1 ? aInstanceModel : mat4(1.0);
    gl_Position = uLightSpaceModel * local * vec4(aPosition, 1.0);
}
"#;

const DEPTH_FRAGMENT: &str = r#"#version 410 core
void main() {
}
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sources_declare_shared_uniforms() {
        let (lit_vs, lit_fs) = BuiltinProgram::Lit.sources();
        for name in [uniforms::MVP, uniforms::LIGHT_SPACE_MODEL, uniforms::INSTANCED] {
            assert!(lit_vs.contains(name), "{name} missing from lit vertex");
        }
        for name in [
            uniforms::LIGHT_COUNT,
            uniforms::LIGHT_DIRECTIONS,
            uniforms::LIGHT_COLORS,
            uniforms::AMBIENT,
            uniforms::SHADOW_MAP,
            uniforms::PCF_RADIUS,
        ] {
            assert!(lit_fs.contains(name), "{name} missing from lit fragment");
        }
        let (_, sky_fs) = BuiltinProgram::Skybox.sources();
        assert!(sky_fs.contains(uniforms::SKY));
    }

    #[test]
    fn test_all_sources_target_glsl_410() {
        for program in BuiltinProgram::ALL {
            let (vs, fs) = program.sources();
            assert!(vs.starts_with("#version 410 core"));
            assert!(fs.starts_with("#version 410 core"));
        }
    }
}
