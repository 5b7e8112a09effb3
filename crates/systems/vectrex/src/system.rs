//! Frame driver: ties the machine core, the host and the bridge leaves together.
//!
//! ```text
//!            poll input
//!   Host ----------------> input::update_controller --> ControllerState
//!                                                          |
//!                          MachineCore::advance(30_000) <--+
//!                              |                 |
//!                      beam segments        PSG samples
//!                              v                 v
//!                    SoftwareVectorRenderer   AudioPump
//!                              |                 |
//!   Host <---- upload_video ---+---- upload_audio+
//! ```
//!
//! Option changes reported by the host are folded in after the frame is
//! delivered, so the geometry never changes mid-frame.

use emu_core::logging::{log, LogCategory, LogLevel};
use emu_core::renderer::Renderer;
use emu_core::types::Frame;
use emu_core::{MountPointInfo, System};
use serde::Serialize;
use serde_json::Value;

use crate::audio::{AudioPump, SAMPLE_RATE};
use crate::cartridge::Cartridge;
use crate::config::{ConfigError, GeometryConfig, ResolutionPreset, CORE_OPTIONS};
use crate::host::{AvInfo, Host, MemoryRegion, Region, SystemInfo};
use crate::input::{input_descriptors, update_controller};
use crate::machine::{ControllerState, MachineCore, FRAME_RATE, TICKS_PER_FRAME};
use crate::rasterizer::{SoftwareVectorRenderer, VectorRenderer};
use crate::state::StateBridge;
use crate::VectrexError;

/// Mount point id of the cartridge slot
pub const CARTRIDGE_MOUNT: &str = "Cartridge";

/// Performance hint handed to the host at startup
pub const PERFORMANCE_LEVEL: u32 = 5;

/// Display aspect ratio (portrait monitor)
pub const ASPECT_RATIO: f32 = 3.0 / 4.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Lifecycle {
    /// No program installed
    Uninitialized,
    /// Program installed, no frame run since the last load or reset
    Ready,
    /// At least one frame has run
    Running,
}

/// The Vectrex console as seen by a frontend.
pub struct VectrexSystem<M: MachineCore, H: Host> {
    machine: M,
    host: H,
    renderer: SoftwareVectorRenderer,
    audio: AudioPump,
    cartridge: Cartridge,
    geometry: GeometryConfig,
    lifecycle: Lifecycle,
    /// Controller lines as last written to the core
    controller: ControllerState,
    frame_count: u64,
    last_segment_count: usize,
}

impl<M: MachineCore, H: Host> VectrexSystem<M, H> {
    pub fn new(machine: M, host: H) -> Self {
        let geometry = GeometryConfig::default();
        Self {
            machine,
            host,
            renderer: SoftwareVectorRenderer::new(geometry.preset),
            audio: AudioPump::new(),
            cartridge: Cartridge::new(),
            geometry,
            lifecycle: Lifecycle::Uninitialized,
            controller: ControllerState::default(),
            frame_count: 0,
            last_segment_count: 0,
        }
    }

    /// Announce options and performance needs, then read the current options.
    pub fn initialize(&mut self) {
        self.host.set_performance_level(PERFORMANCE_LEVEL);
        self.host.set_core_options(&CORE_OPTIONS);
        self.apply_configuration();
    }

    /// Re-read geometry options from the host and announce the result.
    ///
    /// Unusable values are logged and skipped; the previous setting for that
    /// value stays. Takes effect from the next rendered frame.
    pub fn apply_configuration(&mut self) -> Vec<ConfigError> {
        let host = &self.host;
        let (geometry, rejected) = self.geometry.resolve(|key| host.variable(key));

        for err in &rejected {
            log(LogCategory::Config, LogLevel::Warn, || {
                format!("ignoring option: {}", err)
            });
        }
        if geometry != self.geometry {
            log(LogCategory::Config, LogLevel::Info, || {
                let (width, height) = geometry.dimensions();
                format!(
                    "geometry {}x{} scale {:.2}/{:.2} shift {:.2}/{:.2}",
                    width,
                    height,
                    geometry.scale_x,
                    geometry.scale_y,
                    geometry.user_shift_x(),
                    geometry.user_shift_y()
                )
            });
        }

        self.geometry = geometry;
        let info = self.av_info();
        self.host.set_geometry(&info);
        rejected
    }

    /// Install a program image and reset the console.
    ///
    /// Empty or oversize images are rejected before anything is touched.
    pub fn load(&mut self, image: &[u8]) -> Result<(), VectrexError> {
        if let Err(err) = Cartridge::validate(image) {
            log(LogCategory::Machine, LogLevel::Warn, || {
                format!("rejected cartridge: {}", err)
            });
            return Err(err.into());
        }

        self.host.set_input_descriptors(&input_descriptors());
        self.cartridge.load(image)?;
        self.machine.load_image(self.cartridge.data());
        self.machine.reset();
        self.machine.reset_audio();
        self.renderer.reset();
        self.lifecycle = Lifecycle::Ready;

        log(LogCategory::Machine, LogLevel::Info, || {
            format!("loaded {} byte cartridge", image.len())
        });
        Ok(())
    }

    /// Empty the cartridge slot. The console keeps running its built-in ROM.
    pub fn unload(&mut self) {
        self.cartridge.clear();
        self.machine.load_image(self.cartridge.data());
        self.machine.reset();
        // An empty slot never makes a fresh console runnable.
        if self.lifecycle != Lifecycle::Uninitialized {
            self.lifecycle = Lifecycle::Ready;
        }
        log(LogCategory::Machine, LogLevel::Info, || {
            "cartridge unloaded".to_string()
        });
    }

    /// Zero the program region and reset the console.
    pub fn reset(&mut self) {
        self.cartridge.clear();
        self.machine.load_image(self.cartridge.data());
        self.restart();
        log(LogCategory::Machine, LogLevel::Info, || "reset".to_string());
    }

    /// Reset button: restart the console with the installed program in place.
    pub fn soft_reset(&mut self) {
        self.restart();
        log(LogCategory::Machine, LogLevel::Info, || "soft reset".to_string());
    }

    fn restart(&mut self) {
        self.machine.reset();
        self.machine.reset_audio();
        if self.lifecycle == Lifecycle::Running {
            self.lifecycle = Lifecycle::Ready;
        }
    }

    /// Drop the program and return to the uninitialized state.
    pub fn shutdown(&mut self) {
        self.cartridge.clear();
        self.machine.load_image(self.cartridge.data());
        self.renderer.reset();
        self.lifecycle = Lifecycle::Uninitialized;
        log(LogCategory::Machine, LogLevel::Info, || "shutdown".to_string());
    }

    /// Emulate and present one frame.
    pub fn run_frame(&mut self) -> Result<&Frame, VectrexError> {
        if self.lifecycle == Lifecycle::Uninitialized {
            return Err(VectrexError::NotLoaded);
        }

        self.host.poll_input();
        let controller = self.machine.controller_mut();
        update_controller(&self.host, controller);
        self.controller = *controller;

        self.machine.advance(TICKS_PER_FRAME);

        let sample_count = self.audio.pump(&mut self.machine).len();
        let drawn = self
            .renderer
            .render_segments(self.machine.beam_segments(), &self.geometry);

        let frame = self.renderer.get_frame();
        self.host
            .upload_video(&frame.pixels, frame.width, frame.height, frame.pitch());
        self.host.upload_audio(self.audio.samples());

        self.frame_count += 1;
        self.last_segment_count = drawn;
        self.lifecycle = Lifecycle::Running;

        log(LogCategory::Video, LogLevel::Trace, || {
            format!("frame {}: {} segments", self.frame_count, drawn)
        });
        log(LogCategory::Audio, LogLevel::Trace, || {
            format!("frame {}: {} samples", self.frame_count, sample_count)
        });

        if self.host.variables_updated() {
            self.apply_configuration();
        }

        Ok(self.renderer.get_frame())
    }

    pub fn state_size(&self) -> usize {
        StateBridge::size(&self.machine)
    }

    /// Snapshot the machine into `buf`, which must be `state_size()` bytes.
    pub fn save_state(&self, buf: &mut [u8]) -> Result<(), VectrexError> {
        StateBridge::save(&self.machine, buf).map_err(|err| {
            log(LogCategory::State, LogLevel::Warn, || {
                format!("save failed: {}", err)
            });
            err.into()
        })
    }

    /// Restore a snapshot. A rejected buffer changes nothing.
    pub fn restore_state(&mut self, buf: &[u8]) -> Result<(), VectrexError> {
        StateBridge::restore(&mut self.machine, buf).map_err(|err| {
            log(LogCategory::State, LogLevel::Warn, || {
                format!("restore failed: {}", err)
            });
            err.into()
        })
    }

    pub fn system_info(&self) -> SystemInfo {
        SystemInfo {
            library_name: "Vectrex",
            library_version: env!("CARGO_PKG_VERSION"),
            valid_extensions: &["bin", "vec"],
            need_fullpath: false,
        }
    }

    pub fn av_info(&self) -> AvInfo {
        let (base_width, base_height) = self.geometry.dimensions();
        let (max_width, max_height) = ResolutionPreset::MAX.dimensions();
        AvInfo {
            fps: FRAME_RATE as f64,
            sample_rate: SAMPLE_RATE as f64,
            base_width,
            base_height,
            max_width,
            max_height,
            aspect_ratio: ASPECT_RATIO,
        }
    }

    pub fn region(&self) -> Region {
        Region::Pal
    }

    /// Raw access to a memory area, if the core exposes it.
    pub fn memory(&mut self, region: MemoryRegion) -> Option<&mut [u8]> {
        match region {
            MemoryRegion::SystemRam => self.machine.system_ram(),
        }
    }

    pub fn geometry(&self) -> &GeometryConfig {
        &self.geometry
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// The most recently rendered frame.
    pub fn frame(&self) -> &Frame {
        self.renderer.get_frame()
    }

    pub fn cartridge(&self) -> &Cartridge {
        &self.cartridge
    }

    pub fn machine(&self) -> &M {
        &self.machine
    }

    pub fn machine_mut(&mut self) -> &mut M {
        &mut self.machine
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// Get debug information
    pub fn debug_state(&self) -> Value {
        serde_json::json!({
            "lifecycle": self.lifecycle,
            "geometry": self.geometry,
            "frame_count": self.frame_count,
            "last_segment_count": self.last_segment_count,
            "controller": {
                "buttons": self.controller.buttons,
                "analog": self.controller.analog,
            },
            "cartridge_size": self.cartridge.image_len(),
        })
    }
}

impl<M: MachineCore, H: Host> System for VectrexSystem<M, H> {
    type Error = VectrexError;

    fn reset(&mut self) {
        self.soft_reset();
    }

    fn step_frame(&mut self) -> Result<&Frame, Self::Error> {
        self.run_frame()
    }

    fn state_size(&self) -> usize {
        StateBridge::size(&self.machine)
    }

    fn save_state(&self, buf: &mut [u8]) -> Result<(), Self::Error> {
        VectrexSystem::save_state(self, buf)
    }

    fn load_state(&mut self, buf: &[u8]) -> Result<(), Self::Error> {
        self.restore_state(buf)
    }

    fn supports_save_states(&self) -> bool {
        true
    }

    fn mount_points(&self) -> Vec<MountPointInfo> {
        vec![MountPointInfo {
            id: CARTRIDGE_MOUNT.to_string(),
            name: "Cartridge Slot".to_string(),
            extensions: vec!["bin".to_string(), "vec".to_string()],
            // The built-in Mine Storm runs with an empty slot.
            required: false,
        }]
    }

    fn mount(&mut self, mount_point_id: &str, data: &[u8]) -> Result<(), Self::Error> {
        if mount_point_id != CARTRIDGE_MOUNT {
            return Err(VectrexError::InvalidMountPoint(mount_point_id.to_string()));
        }
        self.load(data)
    }

    fn unmount(&mut self, mount_point_id: &str) -> Result<(), Self::Error> {
        if mount_point_id != CARTRIDGE_MOUNT {
            return Err(VectrexError::InvalidMountPoint(mount_point_id.to_string()));
        }
        self.unload();
        Ok(())
    }

    fn is_mounted(&self, mount_point_id: &str) -> bool {
        mount_point_id == CARTRIDGE_MOUNT && self.cartridge.is_loaded()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{AnalogAxis, JoypadButton};
    use crate::machine::{BeamSegment, CART_CAPACITY, SYSTEM_RAM_SIZE};
    use std::collections::HashMap;

    struct StubMachine {
        cart: Vec<u8>,
        ram: Vec<u8>,
        segments: Vec<BeamSegment>,
        controller: ControllerState,
        ticks: u64,
        resets: usize,
        audio_resets: usize,
    }

    impl StubMachine {
        fn new() -> Self {
            Self {
                cart: vec![0; CART_CAPACITY],
                ram: vec![0; SYSTEM_RAM_SIZE],
                segments: vec![BeamSegment::point(16_500, 20_500, 127)],
                controller: ControllerState::default(),
                ticks: 0,
                resets: 0,
                audio_resets: 0,
            }
        }
    }

    impl MachineCore for StubMachine {
        fn advance(&mut self, ticks: u32) {
            self.ticks += ticks as u64;
        }
        fn beam_segments(&self) -> &[BeamSegment] {
            &self.segments
        }
        fn fill_audio(&mut self, out: &mut [u8]) {
            out.fill(0x80);
        }
        fn state_size(&self) -> usize {
            8
        }
        fn save_state(&self, buf: &mut [u8]) -> bool {
            buf.copy_from_slice(&self.ticks.to_le_bytes());
            true
        }
        fn restore_state(&mut self, buf: &[u8]) -> bool {
            match <[u8; 8]>::try_from(buf) {
                Ok(bytes) => {
                    self.ticks = u64::from_le_bytes(bytes);
                    true
                }
                Err(_) => false,
            }
        }
        fn poke_cart(&mut self, addr: u16, value: u8) {
            self.cart[addr as usize] = value;
        }
        fn reset(&mut self) {
            self.resets += 1;
        }
        fn reset_audio(&mut self) {
            self.audio_resets += 1;
        }
        fn controller_mut(&mut self) -> &mut ControllerState {
            &mut self.controller
        }
        fn system_ram(&mut self) -> Option<&mut [u8]> {
            Some(&mut self.ram)
        }
    }

    #[derive(Default)]
    struct StubHost {
        vars: HashMap<&'static str, String>,
        frames: usize,
        samples: usize,
        geometry: Option<AvInfo>,
        descriptors: usize,
        options: usize,
        performance: Option<u32>,
    }

    impl Host for StubHost {
        fn poll_input(&mut self) {}
        fn joypad_pressed(&self, port: usize, button: JoypadButton) -> bool {
            port == 0 && button == JoypadButton::A
        }
        fn analog_axis(&self, _port: usize, _axis: AnalogAxis) -> i16 {
            0
        }
        fn upload_video(&mut self, pixels: &[u16], width: u32, height: u32, pitch: usize) {
            assert_eq!(pixels.len(), (width * height) as usize);
            assert_eq!(pitch, width as usize * 2);
            self.frames += 1;
        }
        fn upload_audio(&mut self, samples: &[i16]) {
            self.samples += samples.len();
        }
        fn variable(&self, key: &str) -> Option<String> {
            self.vars.get(key).cloned()
        }
        fn set_geometry(&mut self, info: &AvInfo) {
            self.geometry = Some(*info);
        }
        fn set_input_descriptors(&mut self, descriptors: &[crate::host::InputDescriptor]) {
            self.descriptors = descriptors.len();
        }
        fn set_core_options(&mut self, options: &[crate::config::CoreOption]) {
            self.options = options.len();
        }
        fn set_performance_level(&mut self, level: u32) {
            self.performance = Some(level);
        }
    }

    fn system() -> VectrexSystem<StubMachine, StubHost> {
        VectrexSystem::new(StubMachine::new(), StubHost::default())
    }

    #[test]
    fn test_system_creation() {
        let sys = system();
        assert_eq!(sys.lifecycle(), Lifecycle::Uninitialized);
        assert_eq!(sys.frame_count(), 0);
        assert_eq!(sys.frame().width, 330);
    }

    #[test]
    fn test_initialize_announces_options() {
        let mut sys = system();
        sys.host_mut().vars.insert("vectrex_resolution", "3".to_string());
        sys.initialize();

        assert_eq!(sys.host().performance, Some(PERFORMANCE_LEVEL));
        assert_eq!(sys.host().options, CORE_OPTIONS.len());
        assert_eq!(sys.geometry().preset, ResolutionPreset::X3);
        let info = sys.host().geometry.unwrap();
        assert_eq!((info.base_width, info.base_height), (990, 1230));
        assert_eq!(sys.lifecycle(), Lifecycle::Uninitialized);
    }

    #[test]
    fn test_run_frame_requires_program() {
        let mut sys = system();
        assert!(matches!(sys.run_frame(), Err(VectrexError::NotLoaded)));
        assert_eq!(sys.machine().ticks, 0);
        assert_eq!(sys.host().frames, 0);
    }

    #[test]
    fn test_load_and_run() {
        let mut sys = system();
        sys.load(&[0x67, 0x20]).unwrap();
        assert_eq!(sys.lifecycle(), Lifecycle::Ready);
        assert_eq!(sys.machine().cart[..3], [0x67, 0x20, 0x00]);
        assert_eq!(sys.machine().resets, 1);
        assert_eq!(sys.machine().audio_resets, 1);
        assert_eq!(sys.host().descriptors, 16);

        let frame = sys.run_frame().unwrap();
        assert_eq!(frame.pixel(165, 205), Some(0x7FFF));
        assert_eq!(sys.lifecycle(), Lifecycle::Running);
        assert_eq!(sys.machine().ticks, TICKS_PER_FRAME as u64);
        assert_eq!(sys.host().frames, 1);
        assert_eq!(sys.host().samples, 1764);
        // Button A on port 0 is held.
        assert_eq!(sys.machine().controller.buttons, 0xFE);
    }

    #[test]
    fn test_soft_reset_keeps_program() {
        let mut sys = system();
        sys.load(&[0xAB; 32]).unwrap();
        sys.run_frame().unwrap();
        System::reset(&mut sys);

        assert_eq!(sys.lifecycle(), Lifecycle::Ready);
        assert_eq!(sys.machine().cart[31], 0xAB);
        assert_eq!(sys.machine().resets, 2);
        assert_eq!(sys.machine().audio_resets, 2);
        assert!(sys.is_mounted(CARTRIDGE_MOUNT));
    }

    #[test]
    fn test_reset_clears_program() {
        let mut sys = system();
        sys.load(&[0xAB; 32]).unwrap();
        sys.run_frame().unwrap();
        sys.reset();

        assert_eq!(sys.lifecycle(), Lifecycle::Ready);
        assert!(sys.machine().cart.iter().all(|&b| b == 0));
        assert_eq!(sys.machine().resets, 2);
        assert_eq!(sys.machine().audio_resets, 2);
        assert!(!sys.is_mounted(CARTRIDGE_MOUNT));
        // The built-in ROM still runs.
        sys.run_frame().unwrap();
    }

    #[test]
    fn test_unload_and_shutdown() {
        let mut sys = system();
        sys.load(&[0xAB; 32]).unwrap();
        sys.unmount(CARTRIDGE_MOUNT).unwrap();
        assert!(!sys.is_mounted(CARTRIDGE_MOUNT));
        assert!(sys.machine().cart.iter().all(|&b| b == 0));
        assert_eq!(sys.lifecycle(), Lifecycle::Ready);
        sys.run_frame().unwrap();

        sys.load(&[0xCD; 8]).unwrap();
        sys.shutdown();
        assert_eq!(sys.lifecycle(), Lifecycle::Uninitialized);
        assert!(sys.machine().cart.iter().all(|&b| b == 0));
        assert!(sys.run_frame().is_err());
    }

    #[test]
    fn test_unload_on_fresh_system_stays_uninitialized() {
        let mut sys = system();
        sys.unload();
        assert_eq!(sys.lifecycle(), Lifecycle::Uninitialized);
        assert!(matches!(sys.run_frame(), Err(VectrexError::NotLoaded)));

        sys.unmount(CARTRIDGE_MOUNT).unwrap();
        assert_eq!(sys.lifecycle(), Lifecycle::Uninitialized);
        assert!(matches!(sys.run_frame(), Err(VectrexError::NotLoaded)));
        assert_eq!(sys.machine().ticks, 0);
        assert_eq!(sys.host().frames, 0);
    }

    #[test]
    fn test_mount_points() {
        let sys = system();
        let mounts = sys.mount_points();
        assert_eq!(mounts.len(), 1);
        assert_eq!(mounts[0].id, "Cartridge");
        assert_eq!(mounts[0].extensions, vec!["bin", "vec"]);
        assert!(!mounts[0].required);
    }

    #[test]
    fn test_invalid_mount_point() {
        let mut sys = system();
        assert!(matches!(
            sys.mount("Tape", &[1]),
            Err(VectrexError::InvalidMountPoint(_))
        ));
        assert!(sys.unmount("Tape").is_err());
        assert!(!sys.is_mounted("Tape"));
        assert_eq!(sys.lifecycle(), Lifecycle::Uninitialized);
    }

    #[test]
    fn test_save_load_state() {
        let mut sys = system();
        assert!(sys.supports_save_states());
        sys.load(&[1]).unwrap();
        sys.step_frame().unwrap();

        let mut buf = vec![0u8; System::state_size(&sys)];
        System::save_state(&sys, &mut buf).unwrap();
        sys.step_frame().unwrap();
        sys.load_state(&buf).unwrap();
        assert_eq!(sys.machine().ticks, TICKS_PER_FRAME as u64);

        assert!(matches!(
            sys.load_state(&buf[..4]),
            Err(VectrexError::State(_))
        ));
        assert_eq!(sys.machine().ticks, TICKS_PER_FRAME as u64);
    }

    #[test]
    fn test_host_facing_info() {
        let mut sys = system();
        let info = sys.system_info();
        assert_eq!(info.library_name, "Vectrex");
        assert_eq!(info.valid_extensions, &["bin", "vec"]);
        assert!(!info.need_fullpath);

        let av = sys.av_info();
        assert_eq!(av.fps, 50.0);
        assert_eq!(av.sample_rate, 44_100.0);
        assert_eq!((av.max_width, av.max_height), (1320, 1640));
        assert_eq!(av.aspect_ratio, 0.75);
        assert_eq!(sys.region(), Region::Pal);

        let ram = sys.memory(MemoryRegion::SystemRam).unwrap();
        assert_eq!(ram.len(), SYSTEM_RAM_SIZE);
    }

    #[test]
    fn test_debug_state() {
        let mut sys = system();
        sys.load(&[1, 2, 3]).unwrap();
        sys.run_frame().unwrap();

        let state = sys.debug_state();
        assert_eq!(state["lifecycle"], "Running");
        assert_eq!(state["frame_count"], 1);
        assert_eq!(state["last_segment_count"], 1);
        assert_eq!(state["controller"]["buttons"], 0xFE);
        assert_eq!(state["cartridge_size"], 3);
        assert_eq!(state["geometry"]["preset"], "X1");
    }
}
