use crate::record::PackageRecord;

/// One piece of a parsed `--own` template.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Literal(String),
    /// `%c`
    Category,
    /// `%n`
    Name,
    /// `%p`
    FullName,
    /// `%m`
    Masked,
    /// `%va`
    Available,
    /// `%vi`
    Installed,
    /// `%s`
    Size,
    /// `%h`
    Homepage,
    /// `%d`
    Description,
    /// `%l`
    License,
}

/// A user output template such as `"%p (%va)\n"`.
///
/// The template is tokenised once, so values substituted into the output
/// are never scanned for placeholders again. Unknown `%x` sequences and
/// backslashes other than `\n` and `\t` are kept literally.
///
/// # Examples
///
/// ```
/// use esearch::{CustomFormat, PackageRecord};
///
/// let mut rec = PackageRecord::new("foo", "app-misc/foo", "1.0");
/// rec.description = "bar".to_string();
/// let format = CustomFormat::parse(r"%n: %d\n");
/// assert_eq!(format.render(&rec), "foo: bar\n");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomFormat {
    tokens: Vec<Token>,
}

impl CustomFormat {
    pub fn parse(template: &str) -> CustomFormat {
        let mut tokens = Vec::new();
        let mut literal = String::new();
        let mut chars = template.chars().peekable();

        while let Some(c) = chars.next() {
            let token = match (c, chars.peek().copied()) {
                ('%', Some('c')) => Some(Token::Category),
                ('%', Some('n')) => Some(Token::Name),
                ('%', Some('p')) => Some(Token::FullName),
                ('%', Some('m')) => Some(Token::Masked),
                ('%', Some('s')) => Some(Token::Size),
                ('%', Some('h')) => Some(Token::Homepage),
                ('%', Some('d')) => Some(Token::Description),
                ('%', Some('l')) => Some(Token::License),
                ('%', Some('v')) => {
                    let mut ahead = chars.clone();
                    ahead.next();
                    let token = match ahead.next() {
                        Some('a') => Some(Token::Available),
                        Some('i') => Some(Token::Installed),
                        _ => None,
                    };
                    if token.is_some() {
                        chars.next();
                    }
                    token
                }
                ('\\', Some('n')) => {
                    chars.next();
                    literal.push('\n');
                    continue;
                }
                ('\\', Some('t')) => {
                    chars.next();
                    literal.push('\t');
                    continue;
                }
                _ => None,
            };

            match token {
                Some(token) => {
                    chars.next();
                    if !literal.is_empty() {
                        tokens.push(Token::Literal(std::mem::take(&mut literal)));
                    }
                    tokens.push(token);
                }
                None => literal.push(c),
            }
        }
        if !literal.is_empty() {
            tokens.push(Token::Literal(literal));
        }

        CustomFormat { tokens }
    }

    /// Substitute `record` into the template.
    pub fn render(&self, record: &PackageRecord) -> String {
        let mut out = String::new();
        for token in &self.tokens {
            let value: &str = match token {
                Token::Literal(text) => text.as_str(),
                Token::Category => record.category(),
                Token::Name => &record.name,
                Token::FullName => &record.full_name,
                Token::Masked => {
                    if record.masked {
                        "masked"
                    } else {
                        ""
                    }
                }
                Token::Available => &record.latest,
                Token::Installed => record.installed.as_deref().unwrap_or(""),
                Token::Size => &record.size,
                Token::Homepage => &record.homepage,
                Token::Description => &record.description,
                Token::License => &record.license,
            };
            out.push_str(value);
        }
        out
    }
}
