const C_KEYWORDS: &[&str] = &[
    "auto", "break", "case", "char", "const", "continue", "default", "do", "double", "else",
    "enum", "extern", "false", "float", "for", "goto", "if", "inline", "int", "long",
    "register", "restrict", "return", "short", "signed", "sizeof", "static", "struct",
    "switch", "true", "typedef", "union", "unsigned", "void", "volatile", "while", "_Bool",
    "_Complex", "_Imaginary"
];

/// An XDR identifier together with its word tokens, for re-casing into C names.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Name {
    text: String,
    tokens: Vec<String>
}

impl Name {
    pub fn from(name: &str) -> Name {
        let mut tokens = vec!();
        let mut current_name = String::new();
        let mut last_char_was_lowercase = false;
        for ch in name.chars() {
            if ch == '_' || ch == '-' || ch == '.' || ch == '/' {
                if !current_name.is_empty() {
                    tokens.push(current_name);
                    current_name = String::new();
                }
                last_char_was_lowercase = false;
                continue;
            }
            if last_char_was_lowercase && ch.is_uppercase() {
                tokens.push(current_name);
                current_name = String::new()
            }
            current_name.push(ch);
            last_char_was_lowercase = ch.is_lowercase();
        }
        if !current_name.is_empty() {
            tokens.push(current_name)
        }

        return Name { text: name.to_string(), tokens: tokens };
    }

    fn check_reserved(s: String, reserved: &[&str]) -> String {
        for k in reserved {
            if &s.as_str() == k {
                return s + "_";
            }
        }
        return s;
    }

    /// The name as written, renamed only if it collides with a C keyword.
    pub fn to_c_identifier(&self) -> String {
        return Name::check_reserved(self.text.clone(), C_KEYWORDS);
    }

    pub fn to_snake_case(&self) -> String {
        let s = self.tokens.iter()
            .map(|x| { x.to_lowercase() })
            .collect::<Vec<String>>().join("_");

        return Name::check_reserved(s, C_KEYWORDS);
    }

    pub fn to_screaming_snake_case(&self) -> String {
        let s = self.tokens.iter()
            .map(|x| { x.to_uppercase() })
            .collect::<Vec<String>>().join("_");

        return Name::check_reserved(s, C_KEYWORDS);
    }
}

impl std::fmt::Display for Name {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name() {
        let n = Name::from("NFS4_PROGRAM");

        assert_eq!(String::from("NFS4_PROGRAM"), n.to_c_identifier());
        assert_eq!(String::from("nfs4_program"), n.to_snake_case());
        assert_eq!(String::from("NFS4_PROGRAM"), n.to_screaming_snake_case());
    }

    #[test]
    fn test_file_stems() {
        assert_eq!(String::from("NFS4_PROT"), Name::from("nfs4-prot").to_screaming_snake_case());
        assert_eq!(String::from("RPCB_PROT"), Name::from("rpcb_prot").to_screaming_snake_case());
        assert_eq!(String::from("MOUNT_V3"), Name::from("mountV3").to_screaming_snake_case());
    }

    #[test]
    fn test_reserved() {
        assert_eq!(String::from("char_"), Name::from("char").to_c_identifier());
        assert_eq!(String::from("register_"), Name::from("register").to_snake_case());
        assert_eq!(String::from("fattr4"), Name::from("fattr4").to_c_identifier());
    }
}
