//! Enhancer and outliner wizard.
//!
//! [`WizardState`] holds everything the two pages show; [`Wizard`] exposes one
//! method per user action. Validation runs before any codec call, and a failed
//! command leaves the state as it was.

use super::handoff::{EphemeralStore, SessionHandoff};
use crate::dimensions::{apply_edit, to_physical, to_pixels, LockedPair};
use crate::error::{ValidationError, WizardError};
use crate::models::{
    Axis, BlobKind, Dimension, ImageInfo, OutputFormat, PixelSize, ProcessingResult, Resolution,
    ThicknessLevel, Unit, DEFAULT_PPI,
};
use crate::requests::{build_enhancement, build_outline, EnhanceInput, OutlineInput};
use crate::services::ImageCodec;

/// Enhancer page state.
///
/// `width` and `height` are the displayed values in `unit`; physical values
/// are kept at full precision and only rounded for display.
#[derive(Debug, Clone, PartialEq)]
pub struct EnhancerState {
    pub upload: Option<ImageInfo>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub unit: Unit,
    pub ppi_horizontal: u32,
    pub ppi_vertical: u32,
    pub lock_aspect: bool,
    /// Pixel size whose ratio the lock preserves
    pub reference: Option<PixelSize>,
    pub format: String,
    pub result: Option<ProcessingResult>,
}

impl Default for EnhancerState {
    fn default() -> Self {
        Self {
            upload: None,
            width: None,
            height: None,
            unit: Unit::Pixels,
            ppi_horizontal: DEFAULT_PPI,
            ppi_vertical: DEFAULT_PPI,
            lock_aspect: true,
            reference: None,
            format: OutputFormat::default().extension().to_string(),
            result: None,
        }
    }
}

impl EnhancerState {
    /// Reference size expressed in the current unit.
    fn reference_in_unit(&self) -> Option<(f64, f64)> {
        let r = self.reference.filter(|r| !r.is_empty())?;
        match self.unit {
            Unit::Pixels => Some((r.width as f64, r.height as f64)),
            Unit::Physical => Some((
                to_physical(r.width as f64, self.ppi_horizontal).ok()?,
                to_physical(r.height as f64, self.ppi_vertical).ok()?,
            )),
        }
    }

    /// Displayed dimensions converted to whole pixels.
    fn pixel_size(&self) -> Option<PixelSize> {
        let (w, h) = (self.width?, self.height?);
        let size = match self.unit {
            Unit::Pixels => PixelSize::new(w.round() as u32, h.round() as u32),
            Unit::Physical => PixelSize::new(
                to_pixels(w, self.ppi_horizontal).ok()?,
                to_pixels(h, self.ppi_vertical).ok()?,
            ),
        };
        Some(size).filter(|s| !s.is_empty())
    }

    fn show_size(&mut self, size: PixelSize) {
        let (w, h) = match self.unit {
            Unit::Pixels => (Some(size.width as f64), Some(size.height as f64)),
            Unit::Physical => (
                to_physical(size.width as f64, self.ppi_horizontal).ok(),
                to_physical(size.height as f64, self.ppi_vertical).ok(),
            ),
        };
        self.width = w;
        self.height = h;
    }

    fn to_input(&self) -> EnhanceInput {
        EnhanceInput {
            source_ref: self
                .upload
                .as_ref()
                .map(|info| info.filename.clone())
                .unwrap_or_default(),
            width: self.width,
            height: self.height,
            unit: self.unit,
            ppi_horizontal: self.ppi_horizontal,
            ppi_vertical: self.ppi_vertical,
            lock_aspect: self.lock_aspect,
            reference: self.reference,
            format: self.format.clone(),
        }
    }
}

/// Outliner page state.
#[derive(Debug, Clone, PartialEq)]
pub struct OutlinerState {
    pub upload: Option<ImageInfo>,
    /// Enhanced result picked up from the handoff
    pub handed_off_ref: Option<String>,
    pub thickness: i64,
    pub format: String,
    pub result: Option<ProcessingResult>,
}

impl Default for OutlinerState {
    fn default() -> Self {
        Self {
            upload: None,
            handed_off_ref: None,
            thickness: ThicknessLevel::default().get() as i64,
            format: OutputFormat::default().extension().to_string(),
            result: None,
        }
    }
}

impl OutlinerState {
    fn to_input(&self) -> OutlineInput {
        OutlineInput {
            upload_ref: self.upload.as_ref().map(|info| info.filename.clone()),
            handed_off_ref: self.handed_off_ref.clone(),
            thickness: self.thickness,
            format: self.format.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct WizardState {
    pub enhancer: EnhancerState,
    pub outliner: OutlinerState,
}

pub struct Wizard<C: ImageCodec, S: EphemeralStore> {
    codec: C,
    handoff: SessionHandoff<S>,
    state: WizardState,
}

impl<C: ImageCodec, S: EphemeralStore> Wizard<C, S> {
    pub fn new(codec: C, store: S) -> Self {
        Self {
            codec,
            handoff: SessionHandoff::new(store),
            state: WizardState::default(),
        }
    }

    pub fn state(&self) -> &WizardState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut WizardState {
        &mut self.state
    }

    pub fn codec(&self) -> &C {
        &self.codec
    }

    pub fn handoff(&self) -> &SessionHandoff<S> {
        &self.handoff
    }

    // Enhancer

    pub async fn upload_for_enhance(
        &mut self,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<&ImageInfo, WizardError> {
        let info = self.codec.upload(file_name, bytes).await?;
        tracing::info!(
            filename = %info.filename,
            width = info.width,
            height = info.height,
            "Image uploaded for enhancement"
        );

        let enhancer = &mut self.state.enhancer;
        enhancer.reference = Some(info.size());
        enhancer.show_size(info.size());
        enhancer.result = None;
        Ok(enhancer.upload.insert(info))
    }

    pub fn set_width(&mut self, value: f64) -> Result<(), WizardError> {
        self.edit_dimension(Axis::Width, value)
    }

    pub fn set_height(&mut self, value: f64) -> Result<(), WizardError> {
        self.edit_dimension(Axis::Height, value)
    }

    fn edit_dimension(&mut self, axis: Axis, value: f64) -> Result<(), WizardError> {
        let enhancer = &mut self.state.enhancer;
        Dimension::new(value, enhancer.unit)?;

        let current = LockedPair {
            width: enhancer.width.unwrap_or(0.0),
            height: enhancer.height.unwrap_or(0.0),
        };
        let next = apply_edit(
            current,
            axis,
            value,
            enhancer.lock_aspect,
            enhancer.reference_in_unit(),
            enhancer.unit,
        );
        enhancer.width = positive(next.width);
        enhancer.height = positive(next.height);
        Ok(())
    }

    /// Switch the display unit, re-expressing the current values.
    pub fn set_unit(&mut self, unit: Unit) -> Result<(), WizardError> {
        let enhancer = &mut self.state.enhancer;
        if enhancer.unit == unit {
            return Ok(());
        }
        let resolution = Resolution::new(enhancer.ppi_horizontal, enhancer.ppi_vertical)?;
        let from = enhancer.unit;

        let width = enhancer
            .width
            .map(|w| reexpress(w, from, unit, resolution.horizontal()))
            .transpose()?;
        let height = enhancer
            .height
            .map(|h| reexpress(h, from, unit, resolution.vertical()))
            .transpose()?;

        enhancer.width = width;
        enhancer.height = height;
        enhancer.unit = unit;
        Ok(())
    }

    pub fn set_resolution(&mut self, horizontal: u32, vertical: u32) -> Result<(), WizardError> {
        let resolution = Resolution::new(horizontal, vertical)?;
        let enhancer = &mut self.state.enhancer;
        enhancer.ppi_horizontal = resolution.horizontal();
        enhancer.ppi_vertical = resolution.vertical();
        Ok(())
    }

    /// Engaging the lock recaptures the reference from the current size.
    pub fn set_lock(&mut self, locked: bool) {
        let enhancer = &mut self.state.enhancer;
        if locked && !enhancer.lock_aspect {
            enhancer.reference = enhancer
                .pixel_size()
                .or_else(|| enhancer.upload.as_ref().map(ImageInfo::size));
            tracing::debug!(reference = ?enhancer.reference, "Aspect lock engaged");
        }
        enhancer.lock_aspect = locked;
    }

    pub fn set_format(&mut self, format: &str) -> Result<(), WizardError> {
        let format = OutputFormat::parse(format)?;
        self.state.enhancer.format = format.extension().to_string();
        Ok(())
    }

    pub async fn enhance(&mut self) -> Result<&ProcessingResult, WizardError> {
        let spec = build_enhancement(&self.state.enhancer.to_input())?;
        let result = self.codec.enhance(&spec).await?;
        tracing::info!(
            result_ref = %result.result_ref,
            width = result.width,
            height = result.height,
            "Enhancement complete"
        );
        Ok(self.state.enhancer.result.insert(result))
    }

    /// Hand the latest enhanced result to the outliner.
    pub fn send_to_outliner(&mut self) -> Result<String, WizardError> {
        let result_ref = self
            .state
            .enhancer
            .result
            .as_ref()
            .map(|r| r.result_ref.clone())
            .ok_or(ValidationError::MissingSource("no enhanced result to hand off"))?;
        self.handoff.handoff(&result_ref);
        Ok(result_ref)
    }

    // Outliner

    /// Pick up a pending handoff, if any. It replaces a previous upload.
    pub fn load_outliner(&mut self) -> Option<&str> {
        if let Some(result_ref) = self.handoff.consume() {
            let outliner = &mut self.state.outliner;
            outliner.upload = None;
            outliner.result = None;
            outliner.handed_off_ref = Some(result_ref);
        }
        self.state.outliner.handed_off_ref.as_deref()
    }

    /// Upload a fresh image for outlining, dropping any pending handoff.
    pub async fn upload_for_outline(
        &mut self,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<&ImageInfo, WizardError> {
        let info = self.codec.upload(file_name, bytes).await?;
        tracing::info!(filename = %info.filename, "Image uploaded for outlining");

        self.handoff.clear();
        let outliner = &mut self.state.outliner;
        outliner.handed_off_ref = None;
        outliner.result = None;
        Ok(outliner.upload.insert(info))
    }

    pub fn set_thickness(&mut self, level: i64) -> Result<(), WizardError> {
        ThicknessLevel::new(level)?;
        self.state.outliner.thickness = level;
        Ok(())
    }

    pub fn set_outline_format(&mut self, format: &str) -> Result<(), WizardError> {
        let format = OutputFormat::parse(format)?;
        self.state.outliner.format = format.extension().to_string();
        Ok(())
    }

    pub async fn extract_outline(&mut self) -> Result<&ProcessingResult, WizardError> {
        let spec = build_outline(&self.state.outliner.to_input())?;
        let result = self.codec.extract_outline(&spec).await?;
        tracing::info!(
            result_ref = %result.result_ref,
            thickness = spec.thickness.get(),
            "Outline extracted"
        );
        Ok(self.state.outliner.result.insert(result))
    }

    /// Download the bytes of the latest result of the given kind.
    pub async fn download(&self, kind: BlobKind) -> Result<Vec<u8>, WizardError> {
        let result = match kind {
            BlobKind::Enhanced => self.state.enhancer.result.as_ref(),
            BlobKind::Outlined => self.state.outliner.result.as_ref(),
            BlobKind::Uploads => None,
        };
        let result = result.ok_or(ValidationError::MissingSource("no result to download"))?;
        Ok(self.codec.fetch(kind, &result.result_ref).await?)
    }

    /// Back to a blank wizard; a pending handoff is dropped too.
    pub fn reset(&mut self) {
        self.state = WizardState::default();
        self.handoff.clear();
    }
}

fn positive(v: f64) -> Option<f64> {
    (v.is_finite() && v > 0.0).then_some(v)
}

fn reexpress(value: f64, from: Unit, to: Unit, ppu: u32) -> Result<f64, ValidationError> {
    match (from, to) {
        (Unit::Pixels, Unit::Physical) => to_physical(value, ppu),
        (Unit::Physical, Unit::Pixels) => to_pixels(value, ppu).map(f64::from),
        _ => Ok(value),
    }
}
