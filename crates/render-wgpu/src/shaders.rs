/// Instanced unit cubes: per-instance centre and RGBA colour.
pub const BLOCK_SHADER: &str = r#"
struct Uniforms {
    view_proj: mat4x4<f32>,
    eye: vec4<f32>,
};

@group(0) @binding(0)
var<uniform> uniforms: Uniforms;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
};

struct InstanceInput {
    @location(2) center: vec3<f32>,
    @location(3) color: vec4<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) normal: vec3<f32>,
    @location(1) color: vec4<f32>,
    @location(2) distance: f32,
};

@vertex
fn vs_block(vertex: VertexInput, instance: InstanceInput) -> VertexOutput {
    let world_pos = vertex.position + instance.center;
    var out: VertexOutput;
    out.clip_position = uniforms.view_proj * vec4<f32>(world_pos, 1.0);
    out.normal = vertex.normal;
    out.color = instance.color;
    out.distance = length(world_pos - uniforms.eye.xyz);
    return out;
}

@fragment
fn fs_block(in: VertexOutput) -> @location(0) vec4<f32> {
    let sun = normalize(vec3<f32>(100.0, 100.0, 20.0));
    let lighting = 0.5 + 0.5 * max(dot(in.normal, sun), 0.0);
    let fog = clamp((in.distance - 40.0) / 60.0, 0.0, 1.0);
    let sky = vec3<f32>(0.62, 0.78, 0.92);
    return vec4<f32>(mix(in.color.rgb * lighting, sky, fog), in.color.a);
}
"#;

/// Flat-coloured ground plane.
pub const GROUND_SHADER: &str = r#"
struct Uniforms {
    view_proj: mat4x4<f32>,
    eye: vec4<f32>,
};

@group(0) @binding(0)
var<uniform> uniforms: Uniforms;

struct GroundVertex {
    @location(0) position: vec3<f32>,
    @location(1) color: vec4<f32>,
};

struct GroundOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) color: vec4<f32>,
    @location(1) distance: f32,
};

@vertex
fn vs_ground(vertex: GroundVertex) -> GroundOutput {
    var out: GroundOutput;
    out.clip_position = uniforms.view_proj * vec4<f32>(vertex.position, 1.0);
    out.color = vertex.color;
    out.distance = length(vertex.position - uniforms.eye.xyz);
    return out;
}

@fragment
fn fs_ground(in: GroundOutput) -> @location(0) vec4<f32> {
    let fog = clamp((in.distance - 40.0) / 60.0, 0.0, 1.0);
    let sky = vec3<f32>(0.62, 0.78, 0.92);
    return vec4<f32>(mix(in.color.rgb, sky, fog), 1.0);
}
"#;
