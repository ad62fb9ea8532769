/// Defines the control table of a device class.
///
/// Each line describes one field: the enum variant, its address, the name used in the device manual,
/// the register [`Width`], the [`Access`], the write [`Policy`] and the factory default.
/// The variant discriminant is the address, so a field converts to its address with `as u8`.
///
/// Tables whose moving speed depends on the movement mode name their angle-limit fields with
/// `angle_limits(cw, ccw)`.
macro_rules! control_table {
    (
        $(#[$meta:meta])*
        pub enum $table:ident : $class:literal $(, angle_limits($cw:ident, $ccw:ident))? {
            $(
                $(#[$fmeta:meta])*
                $field:ident = $addr:literal, $name:literal, $width:ident, $access:ident, $policy:expr, $initial:expr;
            )+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, FromPrimitive)]
        #[repr(u8)]
        pub enum $table {
            $(
                $(#[$fmeta])*
                #[doc = concat!("\n\nManual name `", $name, "`, at address ", stringify!($addr), ".")]
                $field = $addr,
            )+
        }

        impl ControlTable for $table {
            const DEVICE_CLASS: &'static str = $class;
            const FIELDS: &'static [Self] = &[$(Self::$field),+];
            $(const ANGLE_LIMITS: Option<(Self, Self)> = Some((Self::$cw, Self::$ccw));)?

            fn descriptor(self) -> RegisterDescriptor {
                match self {
                    $(
                        Self::$field => RegisterDescriptor {
                            name: $name,
                            address: $addr,
                            width: Width::$width,
                            access: Access::$access,
                            policy: $policy,
                            initial: $initial,
                        },
                    )+
                }
            }

            fn from_address(address: u8) -> Result<Self, RegisterError> {
                Self::from_u8(address).ok_or(RegisterError::UnknownAddress(address))
            }
        }
    };
}
