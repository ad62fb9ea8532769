/// Generates a getter for every listed field and a setter for the writable ones.
///
/// Used inside the `impl` block of a device facade holding `controller` and `id`.
macro_rules! field_accessors {
    (
        $table:ident {
            $( $field:ident => $getter:ident $(, $setter:ident)?; )+
        }
    ) => {
        $(
            #[doc = concat!("Reads [`", stringify!($table), "::", stringify!($field), "`].")]
            pub fn $getter(&mut self) -> Result<RegisterValue, Error<B::Error>> {
                self.controller.read(self.id, $table::$field)
            }

            $(
                #[doc = concat!(
                    "Writes [`", stringify!($table), "::", stringify!($field),
                    "`] and returns the value transmitted."
                )]
                pub fn $setter(&mut self, value: i32) -> Result<RegisterValue, Error<B::Error>> {
                    self.controller.write(self.id, $table::$field, value)
                }
            )?
        )+
    };
}
