//! Platform configurations
//!
//! A platform supplies the preamble text and the bridge registry wired as
//! the parent of every module scope. Both built-in configurations keep
//! `string.h` in the preamble: the three-way string compare primitive is
//! part of the lowering contract on every target.

use kr_resolve::{BridgeModule, BridgeRegistry, TypeKind};

const HOST_PREAMBLE: &str = "\
#include <stdint.h>
#include <stdbool.h>
#include <string.h>
#include <stdio.h>
";

// The avr_* entry points come from the device support library at link
// time; the toolchain headers do not declare them.
const AVR_PREAMBLE: &str = "\
#include <stdint.h>
#include <stdbool.h>
#include <string.h>

void avr_pin_mode(int32_t pin, int32_t mode);
void avr_digital_write(int32_t pin, int32_t level);
void avr_delay_ms(int32_t ms);
";

/// One compilation target: preamble text plus bridge registry
#[derive(Debug)]
pub struct Platform {
    name: &'static str,
    preamble: &'static str,
    registry: BridgeRegistry,
}

impl Platform {
    /// General-purpose host target
    pub fn host() -> Self {
        let registry = BridgeRegistry::new().with_module(
            BridgeModule::new("io")
                .bind("print", "printf", vec![TypeKind::Str], TypeKind::None)
                .bind("put_char", "putchar", vec![TypeKind::Int32], TypeKind::Int32),
        );
        Self {
            name: "host",
            preamble: HOST_PREAMBLE,
            registry,
        }
    }

    /// Constrained embedded target
    pub fn avr() -> Self {
        let registry = BridgeRegistry::new().with_module(
            BridgeModule::new("avr")
                .bind(
                    "pin_mode",
                    "avr_pin_mode",
                    vec![TypeKind::Int32, TypeKind::Int32],
                    TypeKind::None,
                )
                .bind(
                    "digital_write",
                    "avr_digital_write",
                    vec![TypeKind::Int32, TypeKind::Int32],
                    TypeKind::None,
                )
                .bind("delay_ms", "avr_delay_ms", vec![TypeKind::Int32], TypeKind::None),
        );
        Self {
            name: "avr",
            preamble: AVR_PREAMBLE,
            registry,
        }
    }

    /// Look a platform up by its flag name
    pub fn by_name(name: &str) -> Option<Self> {
        match name {
            "host" => Some(Self::host()),
            "avr" => Some(Self::avr()),
            _ => None,
        }
    }

    /// Flag name of this platform
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Includes and extern declarations emitted ahead of everything else
    pub fn preamble(&self) -> &'static str {
        self.preamble
    }

    /// The shared, read-only bridge registry
    pub fn registry(&self) -> &BridgeRegistry {
        &self.registry
    }
}
