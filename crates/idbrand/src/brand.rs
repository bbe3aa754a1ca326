//! Brand helper and nominal type declarations.

use idbrand_schema::NominalType;

use crate::BrandMode;

const LENIENT_PRELUDE: &str = "\
export interface Flavoring<FlavorT> {
  _type?: FlavorT
}
export type Flavor<T, FlavorT> = T & Flavoring<FlavorT>

";

const STRICT_PRELUDE: &str = "\
export interface Branding<BrandT> {
  _type: BrandT
}
export type Brand<T, BrandT> = T & Branding<BrandT>

";

impl BrandMode {
    /// Name of the interface carrying the phantom brand field.
    pub fn marker_interface(self) -> &'static str {
        match self {
            BrandMode::Lenient => "Flavoring",
            BrandMode::Strict => "Branding",
        }
    }

    /// Name of the generic alias intersecting a primitive with the marker.
    pub fn marker_alias(self) -> &'static str {
        match self {
            BrandMode::Lenient => "Flavor",
            BrandMode::Strict => "Brand",
        }
    }

    /// Helper declarations emitted once per file.
    pub fn prelude(self) -> &'static str {
        match self {
            BrandMode::Lenient => LENIENT_PRELUDE,
            BrandMode::Strict => STRICT_PRELUDE,
        }
    }

    /// `export type UserId = Flavor<string, '__UserId'>`, indented and newline-terminated.
    pub fn alias_declaration(self, nominal: &NominalType, indent: &str) -> String {
        format!(
            "{indent}export type {} = {}<string, '{}'>\n",
            nominal.name,
            self.marker_alias(),
            nominal.brand_key
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lenient_brand_is_optional() {
        let prelude = BrandMode::Lenient.prelude();
        assert!(prelude.contains("_type?: FlavorT"));
        assert!(prelude.contains("export type Flavor<T, FlavorT> = T & Flavoring<FlavorT>"));
    }

    #[test]
    fn test_strict_brand_is_mandatory() {
        let prelude = BrandMode::Strict.prelude();
        assert!(prelude.contains("  _type: BrandT\n"));
        assert!(!prelude.contains("_type?"));
        assert!(prelude.contains("export type Brand<T, BrandT> = T & Branding<BrandT>"));
    }

    #[test]
    fn test_alias_declaration() {
        let nominal = NominalType::for_model("User");
        assert_eq!(
            BrandMode::Lenient.alias_declaration(&nominal, ""),
            "export type UserId = Flavor<string, '__UserId'>\n"
        );
        assert_eq!(
            BrandMode::Strict.alias_declaration(&nominal, "  "),
            "  export type UserId = Brand<string, '__UserId'>\n"
        );
    }
}
