use crate::error::{CamToolError, CamToolResult};
use std::path::Path;
use stencilmill_core::{CirclePlacement, MillProfile};
use tracing::info;

/// Generator for plunge-milling G-Code over a list of placements
pub struct ToolpathEmitter {
    profile: MillProfile,
    /// Image height (mm) used to mirror Y into machine orientation
    flip_height: Option<f64>,
}

impl ToolpathEmitter {
    /// Create a new ToolpathEmitter, rejecting non-positive profile values
    pub fn new(profile: MillProfile) -> CamToolResult<Self> {
        profile.validate()?;
        Ok(Self {
            profile,
            flip_height: None,
        })
    }

    /// Mirror Y so that image rows (growing down) map to machine Y (growing up)
    pub fn with_flip_y(mut self, image_height: f64) -> Self {
        self.flip_height = Some(image_height);
        self
    }

    fn machine_y(&self, y: f64) -> f64 {
        match self.flip_height {
            Some(height) => height - y,
            None => y,
        }
    }

    /// Generate the G-Code: travel, plunge and retract once per placement
    pub fn generate(&self, placements: &[CirclePlacement]) -> CamToolResult<String> {
        let mut gcode = String::new();
        let p = &self.profile;

        // Header
        gcode.push_str("; StencilMill Plunge Toolpath\n");
        if let Some(first) = placements.first() {
            gcode.push_str(&format!("; Tool Diameter: {:.3} mm\n", first.diameter()));
        }
        gcode.push_str(&format!("; Placements: {}\n", placements.len()));
        gcode.push_str(&format!(
            "; Mill Depth: {:.3} mm, Safe Height: {:.3} mm\n",
            p.mill_depth, p.safe_height
        ));

        // Initialization
        gcode.push_str("G21 ; Set units to millimeters\n");
        gcode.push_str("G90 ; Absolute positioning\n");
        gcode.push_str(&format!(
            "G0 Z{:.3} F{:.1} ; Move to safe height\n",
            p.safe_height, p.travel_rate
        ));

        let plunge_z = -p.mill_depth.abs();
        for placement in placements {
            let x = placement.center.x;
            let y = self.machine_y(placement.center.y);
            if !x.is_finite() || !y.is_finite() {
                return Err(CamToolError::GenerationFailed(format!(
                    "placement at ({}, {}) is not a finite position",
                    x, y
                )));
            }
            gcode.push_str(&format!("G0 X{:.3} Y{:.3} F{:.1}\n", x, y, p.travel_rate));
            gcode.push_str(&format!("G1 Z{:.3} F{:.1}\n", plunge_z, p.mill_rate));
            gcode.push_str(&format!(
                "G0 Z{:.3} F{:.1} ; Retract to safe height\n",
                p.safe_height, p.travel_rate
            ));
        }

        gcode.push_str("M30 ; End program\n");
        Ok(gcode)
    }

    /// Generate and write the G-Code to a file
    pub fn write_to_file<P: AsRef<Path>>(
        &self,
        placements: &[CirclePlacement],
        path: P,
    ) -> CamToolResult<()> {
        let gcode = self.generate(placements)?;
        std::fs::write(path.as_ref(), gcode)?;
        info!(
            "Wrote {} plunges to {}",
            placements.len(),
            path.as_ref().display()
        );
        Ok(())
    }
}
