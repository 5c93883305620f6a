// Copyright 2025 ember contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! GLSL source text for the built-in shader set.
//!
//! Sampler uniforms carry a companion `<name>_is_active` int uniform so a
//! shader can distinguish "slot bound to the shared default texture"
//! from a real binding.

/// Shared vertex stage for mesh passes: position/normal/uv layout plus the
/// `ViewData` block.
pub(crate) const MESH_VS: &str = r#"
#version 330 core
layout (location = 0) in vec3 in_position;
layout (location = 1) in vec3 in_normal;
layout (location = 2) in vec2 in_uv;

layout (std140) uniform ViewData
{
    mat4 projection;
    mat4 view;
    mat4 light_space;
    vec4 camera_position;
    float z_near;
    float z_far;
};

uniform mat4 model;

out vec3 v_world_pos;
out vec3 v_normal;
out vec2 v_uv;
out vec4 v_light_space_pos;

void main()
{
    vec4 world = model * vec4(in_position, 1.0);
    v_world_pos = world.xyz;
    v_normal = mat3(transpose(inverse(model))) * in_normal;
    v_uv = in_uv;
    v_light_space_pos = light_space * world;
    gl_Position = projection * view * world;
}
"#;

pub(crate) const UNLIT_FS: &str = r#"
#version 330 core
in vec3 v_world_pos;
in vec3 v_normal;
in vec2 v_uv;
in vec4 v_light_space_pos;
out vec4 frag_color;

uniform vec4 object_color;
uniform int surface_type;
uniform sampler2D diffuse_map;
uniform int diffuse_map_is_active;

void main()
{
    vec4 base = object_color;
    if (diffuse_map_is_active == 1)
        base *= texture(diffuse_map, v_uv);
    frag_color = base;
}
"#;

pub(crate) const PBR_LIT_FS: &str = r#"
#version 330 core
in vec3 v_world_pos;
in vec3 v_normal;
in vec2 v_uv;
in vec4 v_light_space_pos;
out vec4 frag_color;

layout (std140) uniform ViewData
{
    mat4 projection;
    mat4 view;
    mat4 light_space;
    vec4 camera_position;
    float z_near;
    float z_far;
};

layout (std140) uniform LightData
{
    int point_light_count;
    int spot_light_count;
    vec4 ambient_color;
    vec4 view_position;
};

struct PointLight { vec3 position; vec3 color; float intensity; float distance; };
struct SpotLight { vec3 position; vec3 direction; vec3 color; float intensity; float cutoff; float outer_cutoff; float distance; };
struct DirectionalLight { vec3 direction; vec3 color; float intensity; };

const int MAX_POINT_LIGHTS = 8;
const int MAX_SPOT_LIGHTS = 8;
uniform PointLight point_lights[MAX_POINT_LIGHTS];
uniform SpotLight spot_lights[MAX_SPOT_LIGHTS];
uniform DirectionalLight directional_light;

uniform sampler2D albedo_map;      uniform int albedo_map_is_active;
uniform sampler2D normal_map;      uniform int normal_map_is_active;
uniform sampler2D roughness_map;   uniform int roughness_map_is_active;
uniform sampler2D metallic_map;    uniform int metallic_map_is_active;
uniform sampler2D ao_map;          uniform int ao_map_is_active;
uniform sampler2D brdf_lut_map;    uniform int brdf_lut_map_is_active;
uniform sampler2D shadow_map;      uniform int shadow_map_is_active;
uniform samplerCube irradiance_map; uniform int irradiance_map_is_active;
uniform samplerCube prefilter_map;  uniform int prefilter_map_is_active;

uniform float metallic_multiplier;
uniform float roughness_multiplier;
uniform int workflow;
uniform vec2 tiling;

const float PI = 3.14159265359;

float distribution_ggx(vec3 n, vec3 h, float roughness)
{
    float a = roughness * roughness;
    float a2 = a * a;
    float ndh = max(dot(n, h), 0.0);
    float denom = ndh * ndh * (a2 - 1.0) + 1.0;
    return a2 / (PI * denom * denom);
}

float geometry_schlick_ggx(float ndv, float roughness)
{
    float r = roughness + 1.0;
    float k = (r * r) / 8.0;
    return ndv / (ndv * (1.0 - k) + k);
}

float geometry_smith(vec3 n, vec3 v, vec3 l, float roughness)
{
    return geometry_schlick_ggx(max(dot(n, v), 0.0), roughness)
         * geometry_schlick_ggx(max(dot(n, l), 0.0), roughness);
}

vec3 fresnel_schlick(float cos_theta, vec3 f0)
{
    return f0 + (1.0 - f0) * pow(clamp(1.0 - cos_theta, 0.0, 1.0), 5.0);
}

float shadow_factor(vec3 n, vec3 l)
{
    if (shadow_map_is_active == 0)
        return 0.0;
    vec3 proj = v_light_space_pos.xyz / v_light_space_pos.w;
    proj = proj * 0.5 + 0.5;
    if (proj.z > 1.0)
        return 0.0;
    float bias = max(0.05 * (1.0 - dot(n, l)), 0.005);
    float closest = texture(shadow_map, proj.xy).r;
    return proj.z - bias > closest ? 1.0 : 0.0;
}

vec3 radiance_contribution(vec3 light_color, float intensity, vec3 l, vec3 v, vec3 n,
                           vec3 albedo, float metallic, float roughness, float attenuation)
{
    vec3 h = normalize(v + l);
    vec3 f0 = mix(vec3(0.04), albedo, metallic);
    vec3 radiance = light_color * intensity * attenuation;

    float ndf = distribution_ggx(n, h, roughness);
    float g = geometry_smith(n, v, l, roughness);
    vec3 f = fresnel_schlick(max(dot(h, v), 0.0), f0);

    vec3 numerator = ndf * g * f;
    float denominator = 4.0 * max(dot(n, v), 0.0) * max(dot(n, l), 0.0) + 0.0001;
    vec3 specular = numerator / denominator;

    vec3 kd = (vec3(1.0) - f) * (1.0 - metallic);
    float ndl = max(dot(n, l), 0.0);
    return (kd * albedo / PI + specular) * radiance * ndl;
}

void main()
{
    vec2 uv = v_uv * tiling;
    vec3 albedo = albedo_map_is_active == 1 ? pow(texture(albedo_map, uv).rgb, vec3(2.2)) : vec3(1.0);
    float roughness = roughness_multiplier * (roughness_map_is_active == 1 ? texture(roughness_map, uv).r : 1.0);
    float metallic = metallic_multiplier * (metallic_map_is_active == 1 ? texture(metallic_map, uv).r : 1.0);
    float ao = ao_map_is_active == 1 ? texture(ao_map, uv).r : 1.0;

    vec3 n = normalize(v_normal);
    if (normal_map_is_active == 1)
    {
        // Screen-space tangent frame; avoids requiring tangent attributes.
        vec3 tangent_normal = texture(normal_map, uv).xyz * 2.0 - 1.0;
        vec3 q1 = dFdx(v_world_pos);
        vec3 q2 = dFdy(v_world_pos);
        vec2 st1 = dFdx(uv);
        vec2 st2 = dFdy(uv);
        vec3 t = normalize(q1 * st2.t - q2 * st1.t);
        vec3 b = -normalize(cross(n, t));
        n = normalize(mat3(t, b, n) * tangent_normal);
    }

    vec3 v = normalize(camera_position.xyz - v_world_pos);
    vec3 lo = vec3(0.0);

    for (int i = 0; i < point_light_count && i < MAX_POINT_LIGHTS; ++i)
    {
        vec3 to_light = point_lights[i].position - v_world_pos;
        float dist = length(to_light);
        float attenuation = 1.0 / max(dist * dist, 0.0001);
        lo += radiance_contribution(point_lights[i].color, point_lights[i].intensity,
                                    normalize(to_light), v, n, albedo, metallic, roughness, attenuation);
    }

    for (int i = 0; i < spot_light_count && i < MAX_SPOT_LIGHTS; ++i)
    {
        vec3 to_light = spot_lights[i].position - v_world_pos;
        float dist = length(to_light);
        vec3 l = normalize(to_light);
        float theta = dot(l, normalize(-spot_lights[i].direction));
        float epsilon = spot_lights[i].cutoff - spot_lights[i].outer_cutoff;
        float cone = clamp((theta - spot_lights[i].outer_cutoff) / epsilon, 0.0, 1.0);
        float attenuation = cone / max(dist * dist, 0.0001);
        lo += radiance_contribution(spot_lights[i].color, spot_lights[i].intensity,
                                    l, v, n, albedo, metallic, roughness, attenuation);
    }

    vec3 sun_l = normalize(-directional_light.direction);
    float shadow = shadow_factor(n, sun_l);
    lo += (1.0 - shadow) * radiance_contribution(directional_light.color, directional_light.intensity,
                                                 sun_l, v, n, albedo, metallic, roughness, 1.0);

    // Image-based ambient term from the captured environment.
    vec3 ambient = ambient_color.rgb * albedo * ao;
    if (irradiance_map_is_active == 1 && prefilter_map_is_active == 1 && brdf_lut_map_is_active == 1)
    {
        vec3 f0 = mix(vec3(0.04), albedo, metallic);
        vec3 f = fresnel_schlick(max(dot(n, v), 0.0), f0);
        vec3 kd = (1.0 - f) * (1.0 - metallic);
        vec3 irradiance = texture(irradiance_map, n).rgb;
        vec3 diffuse = irradiance * albedo;

        const float MAX_REFLECTION_LOD = 4.0;
        vec3 r = reflect(-v, n);
        vec3 prefiltered = textureLod(prefilter_map, r, roughness * MAX_REFLECTION_LOD).rgb;
        vec2 brdf = texture(brdf_lut_map, vec2(max(dot(n, v), 0.0), roughness)).rg;
        vec3 specular = prefiltered * (f * brdf.x + brdf.y);

        ambient = (kd * diffuse + specular) * ao;
    }

    frag_color = vec4(ambient + lo, 1.0);
}
"#;

pub(crate) const SKYBOX_VS: &str = r#"
#version 330 core
layout (location = 0) in vec3 in_position;

layout (std140) uniform ViewData
{
    mat4 projection;
    mat4 view;
    mat4 light_space;
    vec4 camera_position;
    float z_near;
    float z_far;
};

out vec3 v_direction;

void main()
{
    v_direction = in_position;
    mat4 rotation_only = mat4(mat3(view));
    vec4 pos = projection * rotation_only * vec4(in_position, 1.0);
    gl_Position = pos.xyww;
}
"#;

pub(crate) const SKYBOX_SINGLE_COLOR_FS: &str = r#"
#version 330 core
in vec3 v_direction;
out vec4 frag_color;

uniform vec4 color;

void main()
{
    frag_color = color;
}
"#;

pub(crate) const SKYBOX_GRADIENT_FS: &str = r#"
#version 330 core
in vec3 v_direction;
out vec4 frag_color;

uniform vec4 start_color;
uniform vec4 end_color;

void main()
{
    float t = clamp(normalize(v_direction).y * 0.5 + 0.5, 0.0, 1.0);
    frag_color = mix(start_color, end_color, t);
}
"#;

pub(crate) const SKYBOX_PROCEDURAL_FS: &str = r#"
#version 330 core
in vec3 v_direction;
out vec4 frag_color;

uniform vec4 start_color;
uniform vec4 end_color;
uniform vec3 sun_direction;

void main()
{
    vec3 dir = normalize(v_direction);
    float horizon = clamp(dir.y * 0.5 + 0.5, 0.0, 1.0);
    vec4 sky = mix(start_color, end_color, pow(horizon, 0.6));
    float sun = pow(max(dot(dir, normalize(-sun_direction)), 0.0), 256.0);
    frag_color = sky + vec4(vec3(sun), 0.0);
}
"#;

pub(crate) const SKYBOX_CUBEMAP_FS: &str = r#"
#version 330 core
in vec3 v_direction;
out vec4 frag_color;

uniform samplerCube environment_map;
uniform int environment_map_is_active;

void main()
{
    frag_color = texture(environment_map, v_direction);
}
"#;

pub(crate) const SKYBOX_HDRI_FS: &str = r#"
#version 330 core
in vec3 v_direction;
out vec4 frag_color;

uniform samplerCube environment_map;
uniform int environment_map_is_active;

void main()
{
    vec3 color = texture(environment_map, v_direction).rgb;
    color = color / (color + vec3(1.0));
    frag_color = vec4(color, 1.0);
}
"#;

/// Fullscreen triangle-pair vertex stage shared by the post-process and
/// composite passes.
pub(crate) const SCREEN_QUAD_VS: &str = r#"
#version 330 core
layout (location = 0) in vec3 in_position;
layout (location = 1) in vec3 in_normal;
layout (location = 2) in vec2 in_uv;

out vec2 v_uv;

void main()
{
    v_uv = in_uv;
    gl_Position = vec4(in_position.xy, 0.0, 1.0);
}
"#;

pub(crate) const SCREEN_QUAD_FINAL_FS: &str = r#"
#version 330 core
in vec2 v_uv;
out vec4 frag_color;

uniform sampler2D screen_map;   uniform int screen_map_is_active;
uniform sampler2D bloom_map;    uniform int bloom_map_is_active;
uniform float exposure;
uniform int bloom_enabled;
uniform int fxaa_enabled;
uniform float fxaa_reduce_min;
uniform float fxaa_reduce_mul;
uniform float fxaa_span_max;
uniform vec3 inverse_screen_size;

void main()
{
    vec3 hdr = texture(screen_map, v_uv).rgb;
    if (bloom_enabled == 1 && bloom_map_is_active == 1)
        hdr += texture(bloom_map, v_uv).rgb;

    // Exposure tone mapping followed by gamma correction.
    vec3 mapped = vec3(1.0) - exp(-hdr * exposure);
    mapped = pow(mapped, vec3(1.0 / 2.2));
    frag_color = vec4(mapped, 1.0);
}
"#;

pub(crate) const SCREEN_QUAD_BLUR_FS: &str = r#"
#version 330 core
in vec2 v_uv;
out vec4 frag_color;

uniform sampler2D screen_map;
uniform int screen_map_is_active;
uniform int is_horizontal;

const float WEIGHTS[5] = float[](0.227027, 0.1945946, 0.1216216, 0.054054, 0.016216);

void main()
{
    vec2 texel = 1.0 / textureSize(screen_map, 0);
    vec3 result = texture(screen_map, v_uv).rgb * WEIGHTS[0];
    for (int i = 1; i < 5; ++i)
    {
        vec2 offset = is_horizontal == 1 ? vec2(texel.x * i, 0.0) : vec2(0.0, texel.y * i);
        result += texture(screen_map, v_uv + offset).rgb * WEIGHTS[i];
        result += texture(screen_map, v_uv - offset).rgb * WEIGHTS[i];
    }
    frag_color = vec4(result, 1.0);
}
"#;

pub(crate) const SHADOW_DEPTH_VS: &str = r#"
#version 330 core
layout (location = 0) in vec3 in_position;

layout (std140) uniform ViewData
{
    mat4 projection;
    mat4 view;
    mat4 light_space;
    vec4 camera_position;
    float z_near;
    float z_far;
};

uniform mat4 model;

void main()
{
    gl_Position = light_space * model * vec4(in_position, 1.0);
}
"#;

pub(crate) const SHADOW_DEPTH_FS: &str = r#"
#version 330 core

void main()
{
    // Depth-only pass.
}
"#;

pub(crate) const HDRI_CUBE_VS: &str = r#"
#version 330 core
layout (location = 0) in vec3 in_position;

uniform mat4 projection;
uniform mat4 view;

out vec3 v_local_pos;

void main()
{
    v_local_pos = in_position;
    gl_Position = projection * view * vec4(in_position, 1.0);
}
"#;

pub(crate) const HDRI_EQUIRECT_FS: &str = r#"
#version 330 core
in vec3 v_local_pos;
out vec4 frag_color;

uniform sampler2D equirect_map;
uniform int equirect_map_is_active;

const vec2 INV_ATAN = vec2(0.1591, 0.3183);

vec2 sample_spherical(vec3 v)
{
    vec2 uv = vec2(atan(v.z, v.x), asin(v.y));
    uv *= INV_ATAN;
    uv += 0.5;
    return uv;
}

void main()
{
    vec2 uv = sample_spherical(normalize(v_local_pos));
    frag_color = vec4(texture(equirect_map, uv).rgb, 1.0);
}
"#;

pub(crate) const HDRI_IRRADIANCE_FS: &str = r#"
#version 330 core
in vec3 v_local_pos;
out vec4 frag_color;

uniform samplerCube environment_map;
uniform int environment_map_is_active;

const float PI = 3.14159265359;

void main()
{
    vec3 normal = normalize(v_local_pos);
    vec3 up = vec3(0.0, 1.0, 0.0);
    vec3 right = normalize(cross(up, normal));
    up = normalize(cross(normal, right));

    vec3 irradiance = vec3(0.0);
    float sample_delta = 0.025;
    float samples = 0.0;
    for (float phi = 0.0; phi < 2.0 * PI; phi += sample_delta)
    {
        for (float theta = 0.0; theta < 0.5 * PI; theta += sample_delta)
        {
            vec3 tangent_sample = vec3(sin(theta) * cos(phi), sin(theta) * sin(phi), cos(theta));
            vec3 sample_vec = tangent_sample.x * right + tangent_sample.y * up + tangent_sample.z * normal;
            irradiance += texture(environment_map, sample_vec).rgb * cos(theta) * sin(theta);
            samples += 1.0;
        }
    }
    irradiance = PI * irradiance / samples;
    frag_color = vec4(irradiance, 1.0);
}
"#;

pub(crate) const HDRI_PREFILTER_FS: &str = r#"
#version 330 core
in vec3 v_local_pos;
out vec4 frag_color;

uniform samplerCube environment_map;
uniform int environment_map_is_active;
uniform float roughness_multiplier;
uniform float environment_resolution;

const float PI = 3.14159265359;
const uint SAMPLE_COUNT = 1024u;

float radical_inverse_vdc(uint bits)
{
    bits = (bits << 16u) | (bits >> 16u);
    bits = ((bits & 0x55555555u) << 1u) | ((bits & 0xAAAAAAAAu) >> 1u);
    bits = ((bits & 0x33333333u) << 2u) | ((bits & 0xCCCCCCCCu) >> 2u);
    bits = ((bits & 0x0F0F0F0Fu) << 4u) | ((bits & 0xF0F0F0F0u) >> 4u);
    bits = ((bits & 0x00FF00FFu) << 8u) | ((bits & 0xFF00FF00u) >> 8u);
    return float(bits) * 2.3283064365386963e-10;
}

vec2 hammersley(uint i, uint n)
{
    return vec2(float(i) / float(n), radical_inverse_vdc(i));
}

vec3 importance_sample_ggx(vec2 xi, vec3 n, float roughness)
{
    float a = roughness * roughness;
    float phi = 2.0 * PI * xi.x;
    float cos_theta = sqrt((1.0 - xi.y) / (1.0 + (a * a - 1.0) * xi.y));
    float sin_theta = sqrt(1.0 - cos_theta * cos_theta);

    vec3 h = vec3(cos(phi) * sin_theta, sin(phi) * sin_theta, cos_theta);
    vec3 up = abs(n.z) < 0.999 ? vec3(0.0, 0.0, 1.0) : vec3(1.0, 0.0, 0.0);
    vec3 tangent = normalize(cross(up, n));
    vec3 bitangent = cross(n, tangent);
    return normalize(tangent * h.x + bitangent * h.y + n * h.z);
}

void main()
{
    vec3 n = normalize(v_local_pos);
    vec3 r = n;
    vec3 v = r;

    float total_weight = 0.0;
    vec3 prefiltered = vec3(0.0);
    for (uint i = 0u; i < SAMPLE_COUNT; ++i)
    {
        vec2 xi = hammersley(i, SAMPLE_COUNT);
        vec3 h = importance_sample_ggx(xi, n, roughness_multiplier);
        vec3 l = normalize(2.0 * dot(v, h) * h - v);
        float ndl = max(dot(n, l), 0.0);
        if (ndl > 0.0)
        {
            prefiltered += texture(environment_map, l).rgb * ndl;
            total_weight += ndl;
        }
    }
    prefiltered /= total_weight;
    frag_color = vec4(prefiltered, 1.0);
}
"#;

pub(crate) const HDRI_BRDF_FS: &str = r#"
#version 330 core
in vec2 v_uv;
out vec2 frag_color;

const float PI = 3.14159265359;
const uint SAMPLE_COUNT = 1024u;

float radical_inverse_vdc(uint bits)
{
    bits = (bits << 16u) | (bits >> 16u);
    bits = ((bits & 0x55555555u) << 1u) | ((bits & 0xAAAAAAAAu) >> 1u);
    bits = ((bits & 0x33333333u) << 2u) | ((bits & 0xCCCCCCCCu) >> 2u);
    bits = ((bits & 0x0F0F0F0Fu) << 4u) | ((bits & 0xF0F0F0F0u) >> 4u);
    bits = ((bits & 0x00FF00FFu) << 8u) | ((bits & 0xFF00FF00u) >> 8u);
    return float(bits) * 2.3283064365386963e-10;
}

vec2 hammersley(uint i, uint n)
{
    return vec2(float(i) / float(n), radical_inverse_vdc(i));
}

vec3 importance_sample_ggx(vec2 xi, vec3 n, float roughness)
{
    float a = roughness * roughness;
    float phi = 2.0 * PI * xi.x;
    float cos_theta = sqrt((1.0 - xi.y) / (1.0 + (a * a - 1.0) * xi.y));
    float sin_theta = sqrt(1.0 - cos_theta * cos_theta);

    vec3 h = vec3(cos(phi) * sin_theta, sin(phi) * sin_theta, cos_theta);
    vec3 up = abs(n.z) < 0.999 ? vec3(0.0, 0.0, 1.0) : vec3(1.0, 0.0, 0.0);
    vec3 tangent = normalize(cross(up, n));
    vec3 bitangent = cross(n, tangent);
    return normalize(tangent * h.x + bitangent * h.y + n * h.z);
}

float geometry_schlick_ggx(float ndv, float roughness)
{
    float k = (roughness * roughness) / 2.0;
    return ndv / (ndv * (1.0 - k) + k);
}

float geometry_smith(vec3 n, vec3 v, vec3 l, float roughness)
{
    return geometry_schlick_ggx(max(dot(n, v), 0.0), roughness)
         * geometry_schlick_ggx(max(dot(n, l), 0.0), roughness);
}

vec2 integrate_brdf(float ndv, float roughness)
{
    vec3 v = vec3(sqrt(1.0 - ndv * ndv), 0.0, ndv);
    float a = 0.0;
    float b = 0.0;
    vec3 n = vec3(0.0, 0.0, 1.0);

    for (uint i = 0u; i < SAMPLE_COUNT; ++i)
    {
        vec2 xi = hammersley(i, SAMPLE_COUNT);
        vec3 h = importance_sample_ggx(xi, n, roughness);
        vec3 l = normalize(2.0 * dot(v, h) * h - v);

        float ndl = max(l.z, 0.0);
        float ndh = max(h.z, 0.0);
        float vdh = max(dot(v, h), 0.0);
        if (ndl > 0.0)
        {
            float g = geometry_smith(n, v, l, roughness);
            float g_vis = (g * vdh) / (ndh * ndv);
            float fc = pow(1.0 - vdh, 5.0);
            a += (1.0 - fc) * g_vis;
            b += fc * g_vis;
        }
    }
    return vec2(a, b) / float(SAMPLE_COUNT);
}

void main()
{
    frag_color = integrate_brdf(v_uv.x, v_uv.y);
}
"#;

pub(crate) const SPRITE_FS: &str = r#"
#version 330 core
in vec3 v_world_pos;
in vec3 v_normal;
in vec2 v_uv;
in vec4 v_light_space_pos;
out vec4 frag_color;

uniform vec4 object_color;
uniform sampler2D diffuse_map;
uniform int diffuse_map_is_active;

void main()
{
    vec4 base = object_color;
    if (diffuse_map_is_active == 1)
        base *= texture(diffuse_map, v_uv);
    if (base.a < 0.01)
        discard;
    frag_color = base;
}
"#;
