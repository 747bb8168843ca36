//! Built-in vocabulary of terms that occur across unrelated software.
//!
//! Every entry is lowercase. Library names are deliberately absent: a name
//! like `zstd` or `lz4` identifies a component and must stay usable.

/// General programming vocabulary.
pub(crate) const PROGRAMMING_TERMS: &[&str] = &[
    "abort", "abstract", "accept", "access", "action", "adapter", "add", "address",
    "alert", "all", "alloc", "allow", "any", "apply", "archive", "argument", "array",
    "assert", "async", "attribute", "audit", "auto", "backup", "base", "batch", "begin",
    "bind", "binary", "bit", "bitmap", "blob", "block", "body", "bool", "boolean",
    "break", "bridge", "buffer", "build", "builder", "bulk", "byte", "cache", "call",
    "callback", "cancel", "case", "cast", "catch", "chain", "change", "channel", "char",
    "check", "checksum", "child", "class", "clean", "cleanup", "clear", "client", "clone",
    "close", "cluster", "codec", "color", "command", "comment", "commit", "common",
    "compare", "compile", "compiler", "compress", "compression", "config", "connect",
    "const", "construct", "consumer", "contains", "context", "continue", "control",
    "convert", "copy", "count", "create", "current", "custom", "data", "database",
    "debug", "decode", "decoder", "decompress", "decompression", "default", "delete",
    "deny", "depth", "destination", "destroy", "dest", "digest", "directory", "disable",
    "disconnect", "display", "dispose", "done", "double", "draw", "dummy", "duration",
    "dynamic", "each", "edge", "element", "empty", "enable", "encode", "encoder",
    "encoding", "end", "ensure", "entity", "entry", "enum", "environment", "equal",
    "equals", "error", "escape", "event", "example", "except", "exception", "exec",
    "execute", "exit", "expire", "export", "expression", "extend", "external", "extract",
    "factory", "fail", "failure", "false", "fatal", "fault", "feature", "fetch", "field",
    "file", "fill", "filter", "final", "finally", "find", "finish", "first", "fix",
    "flag", "float", "flush", "folder", "font", "format", "frame", "free", "function",
    "future", "generate", "get", "global", "graph", "group", "guard", "handle", "handler",
    "hash", "head", "header", "heap", "height", "hex", "hide", "history", "host", "image",
    "impl", "import", "index", "info", "init", "initialize", "input", "insert", "install",
    "instance", "int", "interface", "internal", "invoke", "item", "iterator", "job",
    "join", "key", "kill", "label", "last", "leaf", "length", "level", "library",
    "limit", "link", "list", "listen", "listener", "load", "loader", "local", "lock",
    "log", "logger", "long", "lookup", "loop", "main", "make", "manager", "map", "mark",
    "match", "max", "member", "memory", "merge", "message", "metadata", "method", "min",
    "mock", "mode", "model", "module", "monitor", "move", "mutex", "name", "namespace",
    "new", "next", "node", "none", "normal", "notify", "null", "number", "object",
    "offset", "ok", "open", "operation", "option", "options", "order", "other", "output",
    "override", "package", "packet", "pair", "param", "params", "parameter", "parent",
    "parse", "parser", "patch", "path", "pause", "peek", "platform", "pointer", "pool",
    "pop", "port", "post", "prev", "previous", "print", "private", "process", "producer",
    "program", "property", "protected", "protocol", "provider", "proxy", "public", "pull",
    "push", "put", "query", "queue", "quit", "random", "read", "reader", "receive",
    "record", "recv", "reference", "refresh", "register", "reject", "release", "reload",
    "remove", "render", "replace", "report", "request", "require", "reset", "resource",
    "response", "restart", "restore", "result", "resume", "retry", "return", "root",
    "route", "run", "runtime", "sample", "save", "scan", "schema", "search", "seed",
    "seek", "select", "self", "send", "serial", "serialize", "server", "service",
    "session", "set", "setting", "settings", "setup", "shared", "show", "signal",
    "signature", "single", "size", "skip", "sleep", "socket", "sort", "source", "split",
    "stack", "start", "state", "static", "status", "stop", "store", "stream", "string",
    "struct", "success", "super", "swap", "switch", "sync", "system", "table", "tag",
    "tail", "target", "task", "tell", "template", "test", "text", "texture", "this",
    "thread", "throw", "time", "timeout", "timer", "timestamp", "toggle", "token",
    "total", "trace", "transform", "tree", "trim", "true", "try", "type", "unicode",
    "unlock", "update", "upgrade", "user", "utf8", "utf16", "validate", "value",
    "variable", "vector", "verify", "version", "virtual", "visit", "visitor", "void",
    "wait", "warning", "width", "word", "work", "worker", "wrap", "write", "writer",
];

/// C runtime and math library symbols present in nearly every native binary.
pub(crate) const RUNTIME_SYMBOLS: &[&str] = &[
    "abs", "acos", "asin", "atan", "atan2", "atexit", "calloc", "cbrt", "ceil", "cos",
    "cosh", "exp", "fabs", "fclose", "floor", "fopen", "fprintf", "fread", "fscanf",
    "fwrite", "getenv", "log10", "malloc", "memcmp", "memcpy", "memmove", "memset",
    "pow", "printf", "realloc", "round", "scanf", "setenv", "sin", "sinh", "sprintf",
    "sqrt", "strcat", "strcmp", "strcpy", "strlen", "strncat", "strncmp", "strncpy",
    "tan", "tanh",
    // symbol version tags
    "cxxabi", "gcc", "glibc", "glibcxx", "libc", "libm",
];

/// Cipher, hash and key-exchange names shared by every crypto library.
pub(crate) const CRYPTO_TERMS: &[&str] = &[
    "3des", "aead", "aes", "aes128", "aes192", "aes256", "argon2", "bcrypt", "blake2b",
    "blake2s", "blowfish", "camellia", "cbc", "ccm", "cfb", "chacha", "chacha20",
    "cipher", "crc", "crc32", "ctr", "curve25519", "curve448", "decrypt", "des", "des3",
    "dh", "dhe", "dsa", "ecb", "ecdh", "ecdhe", "ecdsa", "ed25519", "ed448", "encrypt",
    "gcm", "hkdf", "hmac", "kdf", "md4", "md5", "nonce", "ofb", "pbkdf2", "poly1305",
    "prf", "prime256v1", "rc4", "ripemd160", "rsa", "salt", "scrypt", "secp256k1",
    "secp256r1", "secp384r1", "secp521r1", "sha", "sha1", "sha224", "sha256", "sha3",
    "sha384", "sha512", "ssl", "ssl3", "sslv3", "tls", "tls12", "tls13", "twofish",
    "x25519", "x448",
];

/// Network protocol and encoding names.
pub(crate) const PROTOCOL_TERMS: &[&str] = &[
    "ascii", "base64", "dns", "ftp", "http", "https", "icmp", "imap", "ip", "ipv4",
    "ipv6", "json", "pop3", "smtp", "ssh", "tcp", "udp", "uri", "url", "xml",
];

/// Bytecode mnemonics that show up in managed-code string tables.
pub(crate) const BYTECODE_OPS: &[&str] = &[
    "box", "br", "brfalse", "brtrue", "beq", "calli", "callvirt", "castclass", "cpblk",
    "cpobj", "dup", "endfinally", "isinst", "jmp", "ldarg", "ldc", "ldfld", "ldloc",
    "ldstr", "leave", "ret", "starg", "stfld", "stloc", "unbox",
];

/// Month names, full and abbreviated.
pub(crate) const MONTHS: &[&str] = &[
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
    "january", "february", "march", "april", "june", "july", "august", "september",
    "october", "november", "december",
];

/// Symbol prefixes that namespace a specific library's API.
pub(crate) const LIBRARY_PREFIXES: &[&str] = &[
    "av", "avcodec", "avdevice", "avfilter", "avformat", "avio", "avutil", "bz2", "cairo",
    "curl", "evp", "ff", "ffi", "ft", "gdk", "gtk", "hb", "jpeg", "lz4", "lzma",
    "mbedtls", "nghttp2", "ogg", "opus", "pcre", "pcre2", "png", "sqlite3", "swr", "sws",
    "tiff", "uv", "vorbis", "webp", "wolfssl", "x264", "x265", "xml", "xmlrpc", "yaml",
    "zstd",
];

/// Library names that stay usable as patterns even though they are short.
pub(crate) const LIBRARY_NAMES: &[&str] = &[
    "brotli", "expat", "ffmpeg", "flac", "glib", "gzip", "icu", "lame", "libav", "lz4",
    "lzo", "mpg123", "ogg", "opus", "pcre", "sdl2", "snappy", "x264", "x265", "zlib",
    "zstd",
];
