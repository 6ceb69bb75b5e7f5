// ============================================================
// Layer 5 — Backend Selection
// ============================================================
// Maps the domain-level DeviceTarget onto each backend's own
// device type, so the data and ml layers can stay generic.
//
//   NdArray       → always CPU
//   Wgpu          → Cpu | DiscreteGpu(id)
//   Autodiff<B>   → whatever B resolves to

use burn::{
    backend::{ndarray::NdArrayDevice, wgpu::WgpuDevice, Autodiff, NdArray, Wgpu},
    prelude::*,
};

use crate::domain::device::DeviceTarget;

/// Backend used by the training loop.
pub type TrainBackend = Autodiff<Wgpu>;

/// Backend used for inference.
pub type InferBackend = Wgpu;

/// A backend that knows how to place tensors on a [`DeviceTarget`].
pub trait ResolveDevice: Backend {
    fn resolve_device(target: DeviceTarget) -> Self::Device;
}

impl ResolveDevice for NdArray {
    fn resolve_device(target: DeviceTarget) -> Self::Device {
        if let DeviceTarget::Accelerator(id) = target {
            tracing::warn!("NdArray backend has no accelerators; ignoring device id {id}");
        }
        NdArrayDevice::Cpu
    }
}

impl ResolveDevice for Wgpu {
    fn resolve_device(target: DeviceTarget) -> Self::Device {
        match target {
            DeviceTarget::Cpu => WgpuDevice::Cpu,
            DeviceTarget::Accelerator(id) => WgpuDevice::DiscreteGpu(id),
        }
    }
}

impl<B: ResolveDevice> ResolveDevice for Autodiff<B> {
    fn resolve_device(target: DeviceTarget) -> Self::Device {
        B::resolve_device(target)
    }
}
