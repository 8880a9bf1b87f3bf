mod argon2id;
mod pbkdf2;
