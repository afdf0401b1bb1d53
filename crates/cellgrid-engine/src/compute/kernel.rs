use std::path::Path;

use naga::{AddressSpace, ImageClass, ImageDimension, ScalarKind, ShaderStage, StorageAccess, TypeInner};

use crate::error::{PipelineError, Result};

pub const DEFAULT_ENTRY_POINT: &str = "reduce";

const OVERRIDE_NAMES: [&str; 2] = ["WG_X", "WG_Y"];
const INPUT_BINDING: u32 = 0;
const OUTPUT_BINDING: u32 = 1;

/// WGSL kernel text plus a label describing where it came from.
#[derive(Debug, Clone)]
pub struct KernelSource {
    origin: String,
    code: String,
}

impl KernelSource {
    /// Reads a kernel file fully into memory.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let code = std::fs::read_to_string(path).map_err(|source| PipelineError::KernelIo {
            path: path.to_path_buf(),
            source,
        })?;

        log::debug!("loaded kernel {} ({} bytes)", path.display(), code.len());
        Ok(Self {
            origin: path.display().to_string(),
            code,
        })
    }

    pub fn from_wgsl(origin: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            code: code.into(),
        }
    }

    /// 1 where the red channel exceeds 0.5, else 0.
    pub fn builtin_threshold() -> Self {
        Self::from_wgsl("builtin:threshold", include_str!("kernels/threshold.wgsl"))
    }

    /// Red channel scaled to 0..=255.
    pub fn builtin_intensity() -> Self {
        Self::from_wgsl("builtin:intensity", include_str!("kernels/intensity.wgsl"))
    }

    #[inline]
    pub fn origin(&self) -> &str {
        &self.origin
    }

    #[inline]
    pub fn code(&self) -> &str {
        &self.code
    }
}

/// A kernel that passed validation for a given work-group edge.
#[derive(Debug, Clone)]
pub struct Kernel {
    source: KernelSource,
    entry_point: String,
    edge: u32,
    overrides: Vec<&'static str>,
}

impl Kernel {
    /// Parses and validates `source` against the reducer's binding contract.
    ///
    /// Checks, in order: WGSL parse, naga validation, the compute entry point,
    /// both group-0 bindings (and no others) and the work-group size.
    pub fn build(source: KernelSource, entry_point: &str, edge: u32) -> Result<Self> {
        let fail = |msg: String| PipelineError::KernelBuild(format!("{}: {msg}", source.origin));

        let module = naga::front::wgsl::parse_str(&source.code)
            .map_err(|e| fail(e.emit_to_string(&source.code)))?;

        // Portable capabilities only: no f64, f16 or other feature-gated types.
        let mut validator = naga::valid::Validator::new(
            naga::valid::ValidationFlags::all(),
            naga::valid::Capabilities::default(),
        );
        validator
            .validate(&module)
            .map_err(|e| fail(e.emit_to_string(&source.code)))?;

        let ep = module
            .entry_points
            .iter()
            .find(|ep| ep.name == entry_point)
            .ok_or_else(|| fail(format!("no entry point named `{entry_point}`")))?;
        if ep.stage != ShaderStage::Compute {
            return Err(fail(format!("`{entry_point}` is not a compute entry point")));
        }

        check_input_binding(&module).map_err(&fail)?;
        check_output_binding(&module).map_err(&fail)?;
        check_no_extra_bindings(&module).map_err(&fail)?;

        let declared: Vec<&'static str> = OVERRIDE_NAMES
            .into_iter()
            .filter(|name| {
                module
                    .overrides
                    .iter()
                    .any(|(_, o)| o.name.as_deref() == Some(*name))
            })
            .collect();

        let overridden = ep
            .workgroup_size_overrides
            .map(|axes| axes.map(|a| a.is_some()))
            .unwrap_or_default();
        check_workgroup(ep.workgroup_size, overridden, &declared, edge).map_err(&fail)?;

        log::debug!(
            "kernel {} validated (entry `{entry_point}`, work-group {edge}x{edge})",
            source.origin
        );

        Ok(Self {
            source,
            entry_point: entry_point.to_owned(),
            edge,
            overrides: declared,
        })
    }

    #[inline]
    pub fn source(&self) -> &KernelSource {
        &self.source
    }

    #[inline]
    pub fn entry_point(&self) -> &str {
        &self.entry_point
    }

    #[inline]
    pub fn edge(&self) -> u32 {
        self.edge
    }

    /// Pipeline-overridable constants to set: each declared `WG_X`/`WG_Y` = edge.
    pub fn pipeline_constants(&self) -> Vec<(&'static str, f64)> {
        self.overrides
            .iter()
            .map(|name| (*name, f64::from(self.edge)))
            .collect()
    }
}

fn find_binding(module: &naga::Module, binding: u32) -> Option<&naga::GlobalVariable> {
    module.global_variables.iter().map(|(_, var)| var).find(|var| {
        var.binding
            .as_ref()
            .is_some_and(|b| b.group == 0 && b.binding == binding)
    })
}

fn check_input_binding(module: &naga::Module) -> std::result::Result<(), String> {
    let var = find_binding(module, INPUT_BINDING)
        .ok_or_else(|| format!("missing @group(0) @binding({INPUT_BINDING}) input texture"))?;

    match module.types[var.ty].inner {
        TypeInner::Image {
            dim: ImageDimension::D2,
            arrayed: false,
            class:
                ImageClass::Sampled {
                    kind: ScalarKind::Float,
                    multi: false,
                },
        } => Ok(()),
        _ => Err(format!("binding {INPUT_BINDING} must be texture_2d<f32>")),
    }
}

fn check_output_binding(module: &naga::Module) -> std::result::Result<(), String> {
    let var = find_binding(module, OUTPUT_BINDING)
        .ok_or_else(|| format!("missing @group(0) @binding({OUTPUT_BINDING}) output buffer"))?;

    let writable = matches!(
        var.space,
        AddressSpace::Storage { access } if access.contains(StorageAccess::STORE)
    );
    if !writable {
        return Err(format!("binding {OUTPUT_BINDING} must be a read_write storage buffer"));
    }

    let element_is_u32 = match module.types[var.ty].inner {
        TypeInner::Array { base, .. } => {
            matches!(module.types[base].inner, TypeInner::Scalar(s) if s == naga::Scalar::U32)
        }
        _ => false,
    };
    if !element_is_u32 {
        return Err(format!("binding {OUTPUT_BINDING} must be array<u32>"));
    }
    Ok(())
}

/// The reducer's layout has exactly two entries; anything else cannot be bound.
fn check_no_extra_bindings(module: &naga::Module) -> std::result::Result<(), String> {
    let extra = module.global_variables.iter().find_map(|(_, var)| {
        var.binding.as_ref().filter(|b| {
            b.group != 0 || (b.binding != INPUT_BINDING && b.binding != OUTPUT_BINDING)
        })
    });

    match extra {
        Some(b) => Err(format!(
            "unexpected @group({}) @binding({}); only bindings {INPUT_BINDING} and {OUTPUT_BINDING} of group 0 are provided",
            b.group, b.binding
        )),
        None => Ok(()),
    }
}

/// Fixed axes must be `[edge, edge, 1]`; overridden x/y axes need a declared override.
fn check_workgroup(
    size: [u32; 3],
    overridden: [bool; 3],
    declared: &[&str],
    edge: u32,
) -> std::result::Result<(), String> {
    if overridden[2] {
        return Err("work-group z size must be the literal 1".to_owned());
    }
    if size[2] != 1 {
        return Err(format!("work-group z size is {}, expected 1", size[2]));
    }

    for (axis, name) in OVERRIDE_NAMES.iter().enumerate() {
        if overridden[axis] {
            if !declared.contains(name) {
                return Err(format!("work-group size uses an override but `{name}` is not declared"));
            }
        } else if size[axis] != edge {
            return Err(format!(
                "work-group size is {}x{}x{}, expected {edge}x{edge}x1",
                size[0], size[1], size[2]
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXED_8: &str = r#"
@group(0) @binding(0) var canvas: texture_2d<f32>;
@group(0) @binding(1) var<storage, read_write> cells: array<u32>;

@compute @workgroup_size(8, 8, 1)
fn reduce(@builtin(global_invocation_id) id: vec3<u32>) {
    let dims = textureDimensions(canvas);
    cells[id.y * dims.x + id.x] = u32(textureLoad(canvas, vec2<i32>(id.xy), 0).r);
}
"#;

    fn wgsl(origin: &str, code: &str) -> KernelSource {
        KernelSource::from_wgsl(origin, code)
    }

    fn build_err(code: &str, entry: &str, edge: u32) -> String {
        match Kernel::build(wgsl("test", code), entry, edge) {
            Err(PipelineError::KernelBuild(msg)) => msg,
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("kernel unexpectedly built"),
        }
    }

    #[test]
    fn builtins_build_for_any_edge() {
        for edge in [4, 8, 16] {
            let k = Kernel::build(KernelSource::builtin_threshold(), DEFAULT_ENTRY_POINT, edge).unwrap();
            assert_eq!(k.pipeline_constants(), vec![("WG_X", f64::from(edge)), ("WG_Y", f64::from(edge))]);

            Kernel::build(KernelSource::builtin_intensity(), DEFAULT_ENTRY_POINT, edge).unwrap();
        }
    }

    #[test]
    fn fixed_workgroup_must_match_edge() {
        let k = Kernel::build(wgsl("fixed", FIXED_8), "reduce", 8).unwrap();
        assert!(k.pipeline_constants().is_empty());
        assert_eq!(k.edge(), 8);

        let msg = build_err(FIXED_8, "reduce", 16);
        assert!(msg.contains("expected 16x16x1"), "{msg}");
    }

    #[test]
    fn missing_entry_point_is_rejected() {
        let msg = build_err(FIXED_8, "main", 8);
        assert!(msg.contains("no entry point named `main`"), "{msg}");
    }

    #[test]
    fn non_compute_entry_point_is_rejected() {
        let code = format!(
            "{FIXED_8}\n@vertex fn vs() -> @builtin(position) vec4<f32> {{ return vec4<f32>(0.0); }}\n"
        );
        let msg = build_err(&code, "vs", 8);
        assert!(msg.contains("not a compute entry point"), "{msg}");
    }

    #[test]
    fn missing_output_binding_is_rejected() {
        let code = r#"
@group(0) @binding(0) var canvas: texture_2d<f32>;

@compute @workgroup_size(8, 8, 1)
fn reduce(@builtin(global_invocation_id) id: vec3<u32>) {
    _ = textureLoad(canvas, vec2<i32>(id.xy), 0);
}
"#;
        let msg = build_err(code, "reduce", 8);
        assert!(msg.contains("binding(1)"), "{msg}");
    }

    #[test]
    fn wrong_output_element_type_is_rejected() {
        let code = FIXED_8
            .replace("array<u32>", "array<f32>")
            .replace("u32(textureLoad", "(textureLoad");
        let msg = build_err(&code, "reduce", 8);
        assert!(msg.contains("array<u32>"), "{msg}");
    }

    #[test]
    fn extra_binding_is_rejected() {
        let code = FIXED_8
            .replace(
                "@compute",
                "@group(0) @binding(2) var<storage, read_write> scratch: array<u32>;\n\n@compute",
            )
            .replace("cells[id.y", "scratch[0] = 1u;\n    cells[id.y");
        let msg = build_err(&code, "reduce", 8);
        assert!(msg.contains("@group(0) @binding(2)"), "{msg}");
    }

    #[test]
    fn binding_outside_group_zero_is_rejected() {
        let code = FIXED_8.replace(
            "@compute",
            "@group(1) @binding(0) var<storage, read> extra: array<u32>;\n\n@compute",
        );
        let msg = build_err(&code, "reduce", 8);
        assert!(msg.contains("@group(1) @binding(0)"), "{msg}");
    }

    #[test]
    fn feature_gated_types_are_rejected() {
        let code = format!(
            "enable f16;\n{}",
            FIXED_8.replace("let dims", "let half: f16 = 1.0h;\n    _ = half;\n    let dims")
        );
        assert!(matches!(
            Kernel::build(wgsl("f16", &code), "reduce", 8),
            Err(PipelineError::KernelBuild(_))
        ));
    }

    #[test]
    fn syntax_errors_are_build_errors() {
        let msg = build_err("fn reduce( {", "reduce", 8);
        assert!(msg.starts_with("test:"), "{msg}");
    }

    #[test]
    fn override_axis_without_named_override_is_rejected() {
        let code = FIXED_8
            .replace("@workgroup_size(8, 8, 1)", "@workgroup_size(SIDE, SIDE, 1)")
            .replace("@group(0) @binding(0)", "override SIDE: u32 = 8u;\n@group(0) @binding(0)");
        let msg = build_err(&code, "reduce", 8);
        assert!(msg.contains("`WG_X` is not declared"), "{msg}");
    }

    #[test]
    fn workgroup_check_is_per_axis() {
        assert!(check_workgroup([8, 8, 1], [false; 3], &[], 8).is_ok());
        assert!(check_workgroup([0, 0, 1], [true, true, false], &["WG_X", "WG_Y"], 8).is_ok());
        assert!(check_workgroup([0, 8, 1], [true, false, false], &["WG_X"], 8).is_ok());
        assert!(check_workgroup([0, 4, 1], [true, false, false], &["WG_X"], 8).is_err());
        assert!(check_workgroup([8, 8, 2], [false; 3], &[], 8).is_err());
        assert!(check_workgroup([8, 8, 0], [false, false, true], &[], 8).is_err());
    }

    #[test]
    fn missing_kernel_file_is_an_io_error() {
        let err = KernelSource::load("/nonexistent/cellgrid/kernel.wgsl").unwrap_err();
        assert!(matches!(err, PipelineError::KernelIo { .. }));
        assert!(err.to_string().contains("/nonexistent/cellgrid/kernel.wgsl"));
    }
}
